//! Organizer views: own requests, dashboard, own stories and story statistics.

use axum::{
    Router,
    extract::{Query, State},
    routing::get,
};
use givehub_common::{AppError, AppResult};
use givehub_core::{OrganizerDashboard, RequestSummary, StatsQuery, StoryStats, TimeRange};
use givehub_db::entities::{donation_request::RequestStatus, story};
use serde::Deserialize;

use crate::{
    extractors::{AuthUser, PageQuery},
    middleware::AppState,
    response::{ApiResponse, Paginated},
};

#[derive(Debug, Deserialize)]
pub struct StatusQuery {
    pub status: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct StatsParams {
    pub time_range: Option<String>,
    pub days: Option<u32>,
    pub limit: Option<usize>,
}

/// Parse a request status, case-insensitively.
pub(crate) fn parse_status(value: &str) -> AppResult<RequestStatus> {
    match value.to_ascii_uppercase().as_str() {
        "DRAFT" => Ok(RequestStatus::Draft),
        "PENDING" => Ok(RequestStatus::Pending),
        "APPROVED" => Ok(RequestStatus::Approved),
        "REJECTED" => Ok(RequestStatus::Rejected),
        _ => Err(AppError::BadRequest(format!("Unknown status: {value}"))),
    }
}

async fn requests(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Query(filter): Query<StatusQuery>,
    Query(query): Query<PageQuery>,
) -> AppResult<Paginated<RequestSummary>> {
    let status = filter
        .status
        .as_deref()
        .filter(|s| !s.is_empty())
        .map(parse_status)
        .transpose()?;
    let page = state
        .request_service
        .my_requests(&user, status, query.page(), query.per_page())
        .await?;
    Ok(Paginated::new(page, &query))
}

async fn dashboard(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<OrganizerDashboard>> {
    let dashboard = state.request_service.dashboard(&user).await?;
    Ok(ApiResponse::ok(dashboard))
}

async fn stories(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> AppResult<Paginated<story::Model>> {
    let page = state
        .story_service
        .my_stories(&user, query.page(), query.per_page())
        .await?;
    Ok(Paginated::new(page, &query))
}

async fn stats(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Query(params): Query<StatsParams>,
) -> AppResult<ApiResponse<StoryStats>> {
    let time_range = params
        .time_range
        .as_deref()
        .map(|value| {
            TimeRange::from_param(value)
                .ok_or_else(|| AppError::BadRequest(format!("Unknown time range: {value}")))
        })
        .transpose()?;
    let query = StatsQuery::new(time_range, params.days, params.limit);

    let stats = state.story_service.stats(&user, query).await?;
    Ok(ApiResponse::ok(stats))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/requests", get(requests))
        .route("/dashboard", get(dashboard))
        .route("/stories", get(stories))
        .route("/stats", get(stats))
}
