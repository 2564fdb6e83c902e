//! Admin endpoints: moderation queue, decisions, statistics and users.

use axum::{
    Router,
    extract::{Path, Query, State},
    middleware,
    response::IntoResponse,
    routing::{delete, get, post},
};
use givehub_common::{AppError, AppResult};
use givehub_core::{AdminStats, RequestSummary};
use givehub_db::entities::{
    donation_request::RequestStatus,
    user::{self, UserRole},
};
use serde::Deserialize;

use super::organizer::{StatusQuery, parse_status};
use crate::{
    extractors::{AuthUser, PageQuery},
    middleware::{AppState, require_admin},
    response::{ApiResponse, Paginated, no_content},
};

#[derive(Debug, Deserialize)]
pub struct RoleQuery {
    pub role: Option<String>,
}

fn parse_role(value: &str) -> AppResult<UserRole> {
    match value.to_ascii_uppercase().as_str() {
        "DONOR" => Ok(UserRole::Donor),
        "ORGANIZER" => Ok(UserRole::Organizer),
        "ADMIN" => Ok(UserRole::Admin),
        _ => Err(AppError::BadRequest(format!("Unknown role: {value}"))),
    }
}

/// Moderation queue, pending requests by default.
async fn requests(
    AuthUser(admin): AuthUser,
    State(state): State<AppState>,
    Query(filter): Query<StatusQuery>,
    Query(query): Query<PageQuery>,
) -> AppResult<Paginated<RequestSummary>> {
    let status = filter
        .status
        .as_deref()
        .filter(|s| !s.is_empty())
        .map(parse_status)
        .transpose()?
        .unwrap_or(RequestStatus::Pending);
    let page = state
        .moderation_service
        .queue(&admin, status, query.page(), query.per_page())
        .await?;
    Ok(Paginated::new(page, &query))
}

async fn approve(
    AuthUser(admin): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<RequestSummary>> {
    let summary = state.moderation_service.approve(&admin, &id).await?;
    Ok(ApiResponse::ok(summary))
}

async fn reject(
    AuthUser(admin): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<RequestSummary>> {
    let summary = state.moderation_service.reject(&admin, &id).await?;
    Ok(ApiResponse::ok(summary))
}

async fn stats(
    AuthUser(admin): AuthUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<AdminStats>> {
    let stats = state.moderation_service.stats(&admin).await?;
    Ok(ApiResponse::ok(stats))
}

async fn users(
    AuthUser(admin): AuthUser,
    State(state): State<AppState>,
    Query(filter): Query<RoleQuery>,
    Query(query): Query<PageQuery>,
) -> AppResult<Paginated<user::Model>> {
    let role = filter
        .role
        .as_deref()
        .filter(|r| !r.is_empty())
        .map(parse_role)
        .transpose()?;
    let page = state
        .user_service
        .list_users(&admin, role, query.page(), query.per_page())
        .await?;
    Ok(Paginated::new(page, &query))
}

async fn delete_user(
    AuthUser(admin): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<impl IntoResponse> {
    state.user_service.delete_user(&admin, &id).await?;
    Ok(no_content())
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/requests", get(requests))
        .route("/requests/{id}/approve", post(approve))
        .route("/requests/{id}/reject", post(reject))
        .route("/stats", get(stats))
        .route("/users", get(users))
        .route("/users/{id}", delete(delete_user))
        .route_layer(middleware::from_fn(require_admin))
}
