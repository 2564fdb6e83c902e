//! Story endpoints. Uploads arrive as multipart forms.

use axum::{
    Router,
    extract::{DefaultBodyLimit, Multipart, Path, Query, State, multipart::Field},
    response::IntoResponse,
    routing::{get, post},
};
use givehub_common::{AppError, AppResult};
use givehub_core::{CreateStoryInput, MediaUpload, StoryPerformance, UpdateStoryInput};
use givehub_db::entities::story::{self, StoryStatus, StoryType};
use serde::{Deserialize, Serialize};
use tower_http::limit::RequestBodyLimitLayer;

use crate::{
    extractors::{AuthUser, PageQuery},
    middleware::AppState,
    response::{ApiResponse, Paginated, no_content},
};

/// Largest multipart body: the biggest video plus form fields.
const MAX_UPLOAD_BODY: usize = 60 * 1024 * 1024;

#[derive(Debug, Deserialize)]
pub struct StoryFilter {
    pub donation_request_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ViewCount {
    pub views: i32,
}

/// Fields collected from a story form.
#[derive(Debug, Default)]
struct StoryForm {
    donation_request_id: Option<String>,
    title: Option<String>,
    content: Option<String>,
    story_type: Option<StoryType>,
    status: Option<StoryStatus>,
    duration: Option<i32>,
    media: Option<MediaUpload>,
}

fn parse_story_type(value: &str) -> AppResult<StoryType> {
    match value.to_ascii_lowercase().as_str() {
        "progress" => Ok(StoryType::Progress),
        "milestone" => Ok(StoryType::Milestone),
        "thank_you" => Ok(StoryType::ThankYou),
        "completion" => Ok(StoryType::Completion),
        _ => Err(AppError::field("type", "The selected type is invalid.")),
    }
}

fn parse_story_status(value: &str) -> AppResult<StoryStatus> {
    match value.to_ascii_uppercase().as_str() {
        "DRAFT" => Ok(StoryStatus::Draft),
        "PUBLISHED" => Ok(StoryStatus::Published),
        "ARCHIVED" => Ok(StoryStatus::Archived),
        _ => Err(AppError::field("status", "The selected status is invalid.")),
    }
}

async fn field_text(field: Field<'_>) -> AppResult<String> {
    field
        .text()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))
}

impl StoryForm {
    async fn read(mut multipart: Multipart) -> AppResult<Self> {
        let mut form = Self::default();

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| AppError::BadRequest(e.to_string()))?
        {
            let name = field.name().unwrap_or("").to_string();

            match name.as_str() {
                "media" => {
                    let file_name = field.file_name().map(ToString::to_string);
                    let content_type = field.content_type().map(ToString::to_string);
                    let data = field
                        .bytes()
                        .await
                        .map_err(|e| AppError::BadRequest(e.to_string()))?;
                    if !data.is_empty() {
                        form.media = Some(MediaUpload {
                            file_name,
                            content_type,
                            data: data.to_vec(),
                        });
                    }
                }
                "donation_request_id" => {
                    form.donation_request_id = non_empty(field_text(field).await?);
                }
                "title" => form.title = Some(field_text(field).await?),
                "content" => form.content = Some(field_text(field).await?),
                "type" => {
                    if let Some(text) = non_empty(field_text(field).await?) {
                        form.story_type = Some(parse_story_type(&text)?);
                    }
                }
                "status" => {
                    if let Some(text) = non_empty(field_text(field).await?) {
                        form.status = Some(parse_story_status(&text)?);
                    }
                }
                "duration" => {
                    if let Some(text) = non_empty(field_text(field).await?) {
                        let seconds = text.parse().map_err(|_| {
                            AppError::field("duration", "The duration must be an integer.")
                        })?;
                        form.duration = Some(seconds);
                    }
                }
                _ => {}
            }
        }

        Ok(form)
    }

    fn into_create(self) -> AppResult<CreateStoryInput> {
        let mut missing = Vec::new();
        if self.donation_request_id.is_none() {
            missing.push("donation_request_id");
        }
        if self.title.is_none() {
            missing.push("title");
        }
        if self.content.is_none() {
            missing.push("content");
        }
        if self.story_type.is_none() {
            missing.push("type");
        }
        if self.media.is_none() {
            missing.push("media");
        }

        match (
            self.donation_request_id,
            self.title,
            self.content,
            self.story_type,
            self.media,
        ) {
            (Some(donation_request_id), Some(title), Some(content), Some(story_type), Some(media)) => {
                Ok(CreateStoryInput {
                    donation_request_id,
                    title,
                    content,
                    story_type,
                    duration: self.duration,
                    media,
                })
            }
            _ => Err(AppError::fields(
                missing
                    .into_iter()
                    .map(|field| (field.to_string(), vec![format!("The {field} field is required.")]))
                    .collect(),
            )),
        }
    }

    fn into_update(self) -> UpdateStoryInput {
        UpdateStoryInput {
            title: self.title,
            content: self.content,
            story_type: self.story_type,
            status: self.status,
            duration: self.duration,
            media: self.media,
        }
    }
}

fn non_empty(text: String) -> Option<String> {
    let trimmed = text.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

async fn list(
    State(state): State<AppState>,
    Query(filter): Query<StoryFilter>,
    Query(query): Query<PageQuery>,
) -> AppResult<Paginated<story::Model>> {
    let request_id = filter.donation_request_id.as_deref().filter(|id| !id.is_empty());
    let page = state
        .story_service
        .list(request_id, query.page(), query.per_page())
        .await?;
    Ok(Paginated::new(page, &query))
}

async fn create(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    multipart: Multipart,
) -> AppResult<ApiResponse<story::Model>> {
    let input = StoryForm::read(multipart).await?.into_create()?;
    let story = state.story_service.create(&user, input).await?;
    Ok(ApiResponse::created(story))
}

async fn show(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<story::Model>> {
    let story = state.story_service.show(&id).await?;
    Ok(ApiResponse::ok(story))
}

async fn update(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    multipart: Multipart,
) -> AppResult<ApiResponse<story::Model>> {
    let input = StoryForm::read(multipart).await?.into_update();
    let story = state.story_service.update(&user, &id, input).await?;
    Ok(ApiResponse::ok(story))
}

async fn delete(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<impl IntoResponse> {
    state.story_service.delete(&user, &id).await?;
    Ok(no_content())
}

async fn record_view(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<ViewCount>> {
    let views = state.story_service.record_view(&id).await?;
    Ok(ApiResponse::ok(ViewCount { views }))
}

async fn performance(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<StoryPerformance>> {
    let performance = state.story_service.performance(&user, &id).await?;
    Ok(ApiResponse::ok(performance))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/{id}", get(show).put(update).delete(delete))
        .route("/{id}/view", post(record_view))
        .route("/{id}/performance", get(performance))
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(MAX_UPLOAD_BODY))
}
