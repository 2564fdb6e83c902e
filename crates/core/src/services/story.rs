//! Story service: photo and video updates organizers post on their requests.

use std::sync::Arc;

use chrono::Utc;
use givehub_common::{AppError, AppResult, IdGenerator};
use givehub_db::{
    entities::{
        donation_request::RequestStatus,
        story::{self, StoryStatus, StoryType},
        user,
    },
    repositories::{DonationRequestRepository, Paged, StoryRepository},
};
use sea_orm::{DatabaseConnection, Set, TransactionTrait};
use validator::Validate;

use super::media::{self, MediaUpload, ValidatedMedia};
use super::storage::StorageService;
use super::story_stats::{self, StatsQuery, StoryPerformance, StoryStats};
use super::user::require_organizer;

/// Input for posting a story.
#[derive(Debug, Clone, Validate)]
pub struct CreateStoryInput {
    pub donation_request_id: String,

    #[validate(length(min = 1, max = 255, message = "The title must be between 1 and 255 characters."))]
    pub title: String,

    #[validate(length(min = 1, max = 500, message = "The content must be between 1 and 500 characters."))]
    pub content: String,

    pub story_type: StoryType,

    /// Seconds on screen; images default to five.
    pub duration: Option<i32>,

    pub media: MediaUpload,
}

/// Input for editing a story. Absent fields are kept.
#[derive(Debug, Clone, Default, Validate)]
pub struct UpdateStoryInput {
    #[validate(length(min = 1, max = 255, message = "The title must be between 1 and 255 characters."))]
    pub title: Option<String>,

    #[validate(length(min = 1, max = 500, message = "The content must be between 1 and 500 characters."))]
    pub content: Option<String>,

    pub story_type: Option<StoryType>,
    pub status: Option<StoryStatus>,
    pub duration: Option<i32>,

    /// Replacement media; the old file is removed once the row is updated.
    pub media: Option<MediaUpload>,
}

/// A file written to storage that no row references yet.
struct StoredMedia {
    key: String,
    url: String,
}

/// Story service for business logic.
#[derive(Clone)]
pub struct StoryService {
    db: Arc<DatabaseConnection>,
    story_repo: StoryRepository,
    request_repo: DonationRequestRepository,
    storage: StorageService,
    id_gen: IdGenerator,
}

impl StoryService {
    /// Create a new story service.
    #[must_use]
    pub fn new(db: Arc<DatabaseConnection>, storage: StorageService) -> Self {
        Self {
            story_repo: StoryRepository::new(Arc::clone(&db)),
            request_repo: DonationRequestRepository::new(Arc::clone(&db)),
            storage,
            id_gen: IdGenerator::new(),
            db,
        }
    }

    /// Post a published story on one of the organizer's approved requests.
    pub async fn create(&self, author: &user::Model, input: CreateStoryInput) -> AppResult<story::Model> {
        require_organizer(author)?;
        input.validate()?;

        let request = self.request_repo.get_by_id(&input.donation_request_id).await?;
        if request.organizer_id != author.id {
            return Err(AppError::Forbidden(
                "You can only post stories on your own requests".to_string(),
            ));
        }
        match request.status {
            RequestStatus::Approved => {}
            RequestStatus::Draft | RequestStatus::Pending | RequestStatus::Rejected => {
                return Err(AppError::InvalidState(
                    "Stories can only be posted on approved requests".to_string(),
                ));
            }
        }

        let upload = media::validate_media(input.media)?;
        let duration = media::resolve_duration(upload.media_type, input.duration)?;
        let media_type = upload.media_type;

        let stored = self.store_media(upload).await?;

        let now = Utc::now();
        let model = story::ActiveModel {
            id: Set(self.id_gen.generate()),
            donation_request_id: Set(request.id),
            author_id: Set(author.id.clone()),
            title: Set(input.title.trim().to_string()),
            content: Set(input.content),
            story_type: Set(input.story_type),
            status: Set(StoryStatus::Published),
            media_type: Set(media_type),
            media_path: Set(stored.key.clone()),
            media_url: Set(stored.url.clone()),
            duration: Set(duration),
            views: Set(0),
            published_at: Set(Some(now.into())),
            created_at: Set(now.into()),
            updated_at: Set(None),
        };

        let story = match self.insert(model).await {
            Ok(story) => story,
            Err(e) => {
                self.discard_media(&stored.key).await;
                return Err(e);
            }
        };

        tracing::info!(
            story_id = %story.id,
            request_id = %story.donation_request_id,
            media_path = %story.media_path,
            "Story published"
        );
        Ok(story)
    }

    /// Edit a story. Only its author may.
    pub async fn update(
        &self,
        author: &user::Model,
        id: &str,
        input: UpdateStoryInput,
    ) -> AppResult<story::Model> {
        let story = self.story_repo.get_by_id(id).await?;
        ensure_author(author, &story)?;

        input.validate()?;

        let replacement = input.media.map(media::validate_media).transpose()?;
        let media_type = replacement
            .as_ref()
            .map_or(story.media_type, |m| m.media_type);
        // New media re-resolves the duration so a video cannot inherit an image default.
        let duration = if replacement.is_some() || input.duration.is_some() {
            Some(media::resolve_duration(media_type, input.duration)?)
        } else {
            None
        };

        let stored = match replacement {
            Some(upload) => Some(self.store_media(upload).await?),
            None => None,
        };

        let old_media_path = story.media_path.clone();
        let first_publish = story.published_at.is_none()
            && input.status == Some(StoryStatus::Published);
        let now = Utc::now();

        let mut active: story::ActiveModel = story.into();
        if let Some(title) = input.title {
            active.title = Set(title.trim().to_string());
        }
        if let Some(content) = input.content {
            active.content = Set(content);
        }
        if let Some(story_type) = input.story_type {
            active.story_type = Set(story_type);
        }
        if let Some(status) = input.status {
            active.status = Set(status);
        }
        if first_publish {
            active.published_at = Set(Some(now.into()));
        }
        if let Some(duration) = duration {
            active.duration = Set(duration);
        }
        if let Some(stored) = &stored {
            active.media_type = Set(media_type);
            active.media_path = Set(stored.key.clone());
            active.media_url = Set(stored.url.clone());
        }
        active.updated_at = Set(Some(now.into()));

        let updated = match self.save(active).await {
            Ok(updated) => updated,
            Err(e) => {
                if let Some(stored) = &stored {
                    self.discard_media(&stored.key).await;
                }
                return Err(e);
            }
        };

        if stored.is_some() {
            self.discard_media(&old_media_path).await;
        }

        tracing::info!(story_id = %updated.id, media_replaced = stored.is_some(), "Story updated");
        Ok(updated)
    }

    /// Delete a story and its media. Only its author may.
    pub async fn delete(&self, author: &user::Model, id: &str) -> AppResult<()> {
        let story = self.story_repo.get_by_id(id).await?;
        ensure_author(author, &story)?;

        self.discard_media(&story.media_path).await;
        self.story_repo.delete(id).await?;

        tracing::info!(story_id = %id, author_id = %author.id, "Story deleted");
        Ok(())
    }

    /// Published stories, newest first.
    pub async fn list(
        &self,
        donation_request_id: Option<&str>,
        page: u64,
        per_page: u64,
    ) -> AppResult<Paged<story::Model>> {
        self.story_repo
            .list_published(donation_request_id, page, per_page)
            .await
    }

    /// Show a published story and count the hit.
    pub async fn show(&self, id: &str) -> AppResult<story::Model> {
        let mut story = self
            .story_repo
            .find_published(id)
            .await?
            .ok_or_else(|| AppError::StoryNotFound(id.to_string()))?;

        if let Some(views) = self.story_repo.increment_views(id).await? {
            story.views = views;
        }
        Ok(story)
    }

    /// Count a view of a published story and return the new total.
    pub async fn record_view(&self, id: &str) -> AppResult<i32> {
        self.story_repo
            .increment_views(id)
            .await?
            .ok_or_else(|| AppError::StoryNotFound(id.to_string()))
    }

    /// The organizer's own stories in any status.
    pub async fn my_stories(
        &self,
        author: &user::Model,
        page: u64,
        per_page: u64,
    ) -> AppResult<Paged<story::Model>> {
        require_organizer(author)?;
        self.story_repo.list_by_author(&author.id, page, per_page).await
    }

    /// Engagement statistics over the organizer's stories.
    pub async fn stats(&self, author: &user::Model, query: StatsQuery) -> AppResult<StoryStats> {
        require_organizer(author)?;

        let now = Utc::now();
        let stories = self.story_repo.find_all_by_author(&author.id).await?;
        Ok(story_stats::compute_stats(&stories, query, now))
    }

    /// How a story does against the author's other stories of its type.
    pub async fn performance(&self, author: &user::Model, id: &str) -> AppResult<StoryPerformance> {
        let story = self.story_repo.get_by_id(id).await?;
        ensure_author(author, &story)?;

        let views = self
            .story_repo
            .find_published_views(&author.id, story.story_type)
            .await?;
        Ok(story_stats::performance(&story, &views))
    }

    async fn store_media(&self, upload: ValidatedMedia) -> AppResult<StoredMedia> {
        let name = media::random_media_name(&self.id_gen);
        let key = media::story_media_key(Utc::now(), &name, upload.extension);

        self.storage.save(&key, &upload.data).await?;
        let url = self.storage.get_url(&key);
        Ok(StoredMedia { key, url })
    }

    /// Best-effort removal of a stored file.
    async fn discard_media(&self, key: &str) {
        if let Err(e) = self.storage.delete(key).await {
            tracing::warn!(error = %e, media_path = %key, "Failed to delete story media");
        }
    }

    async fn insert(&self, model: story::ActiveModel) -> AppResult<story::Model> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        let story = StoryRepository::create_in(&txn, model).await?;
        txn.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(story)
    }

    async fn save(&self, model: story::ActiveModel) -> AppResult<story::Model> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        let story = StoryRepository::update_in(&txn, model).await?;
        txn.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(story)
    }
}

fn ensure_author(author: &user::Model, story: &story::Model) -> AppResult<()> {
    if story.author_id == author.id {
        Ok(())
    } else {
        Err(AppError::Forbidden("You are not the author of this story".to_string()))
    }
}
