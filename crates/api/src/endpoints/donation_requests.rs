//! Donation request endpoints: browsing, organizer editing and donations.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    response::IntoResponse,
    routing::{get, post},
};
use givehub_common::{AppError, AppResult};
use givehub_core::{
    CreateRequestInput, DonateInput, DonationReceipt, DonationView, Progress, RequestDetail,
    RequestSummary, UpdateRequestInput,
};
use givehub_db::{
    entities::donation_request::{DonationType, Urgency},
    repositories::{RequestFilter, RequestSort, SortOrder},
};
use serde::Deserialize;

use crate::{
    extractors::{AuthUser, MaybeAuthUser, PageQuery},
    middleware::AppState,
    response::{ApiResponse, Paginated, no_content},
};

/// Query parameters of the public listing.
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub category_id: Option<i32>,
    pub donation_type: Option<String>,
    pub location: Option<String>,
    pub urgency: Option<String>,
    pub search: Option<String>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
}

impl ListQuery {
    /// Unknown sort keys fall back to `created_at`; unknown filter values are rejected.
    fn filter(&self) -> AppResult<RequestFilter> {
        let donation_type = self
            .donation_type
            .as_deref()
            .filter(|t| !t.is_empty())
            .map(|t| {
                DonationType::from_tag(t)
                    .ok_or_else(|| AppError::BadRequest(format!("Unknown donation type: {t}")))
            })
            .transpose()?;

        let urgency = self
            .urgency
            .as_deref()
            .filter(|u| !u.is_empty())
            .map(parse_urgency)
            .transpose()?;

        Ok(RequestFilter {
            category_id: self.category_id,
            donation_type,
            location: self.location.clone(),
            urgency,
            search: self.search.clone(),
            sort: self
                .sort_by
                .as_deref()
                .and_then(RequestSort::from_param)
                .unwrap_or_default(),
            order: self
                .sort_order
                .as_deref()
                .and_then(SortOrder::from_param)
                .unwrap_or_default(),
        })
    }
}

fn parse_urgency(value: &str) -> AppResult<Urgency> {
    match value.to_ascii_uppercase().as_str() {
        "LOW" => Ok(Urgency::Low),
        "MEDIUM" => Ok(Urgency::Medium),
        "HIGH" => Ok(Urgency::High),
        _ => Err(AppError::BadRequest(format!("Unknown urgency: {value}"))),
    }
}

/// Approved requests.
async fn list(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
    Query(paging): Query<PageQuery>,
) -> AppResult<Paginated<RequestSummary>> {
    let filter = query.filter()?;
    let page = state
        .request_service
        .list(&filter, paging.page(), paging.per_page())
        .await?;
    Ok(Paginated::new(page, &paging))
}

/// Submit a new request for review.
async fn create(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreateRequestInput>,
) -> AppResult<ApiResponse<RequestDetail>> {
    let detail = state.request_service.create(&user, input).await?;
    Ok(ApiResponse::created(detail))
}

/// Request detail; counts a view.
async fn show(
    MaybeAuthUser(viewer): MaybeAuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<RequestDetail>> {
    let detail = state.request_service.show(viewer.as_ref(), &id).await?;
    Ok(ApiResponse::ok(detail))
}

async fn update(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<UpdateRequestInput>,
) -> AppResult<ApiResponse<RequestDetail>> {
    let detail = state.request_service.update(&user, &id, input).await?;
    Ok(ApiResponse::ok(detail))
}

async fn delete(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<impl IntoResponse> {
    state.request_service.delete(&user, &id).await?;
    Ok(no_content())
}

/// Send a draft or rejected request to review.
async fn submit(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<RequestSummary>> {
    let summary = state.request_service.submit(&user, &id).await?;
    Ok(ApiResponse::ok(summary))
}

async fn progress(
    MaybeAuthUser(viewer): MaybeAuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<Progress>> {
    let progress = state.request_service.progress(viewer.as_ref(), &id).await?;
    Ok(ApiResponse::ok(progress))
}

async fn list_donations(
    MaybeAuthUser(viewer): MaybeAuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<PageQuery>,
) -> AppResult<Paginated<DonationView>> {
    let page = state
        .donation_service
        .list_for_request(viewer.as_ref(), &id, query.page(), query.per_page())
        .await?;
    Ok(Paginated::new(page, &query))
}

async fn donate(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<DonateInput>,
) -> AppResult<ApiResponse<DonationReceipt>> {
    let receipt = state.donation_service.donate(&user, &id, input).await?;
    Ok(ApiResponse::created(receipt))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/{id}", get(show).put(update).delete(delete))
        .route("/{id}/submit", post(submit))
        .route("/{id}/progress", get(progress))
        .route("/{id}/donations", get(list_donations).post(donate))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_sort_falls_back() {
        let query = ListQuery {
            sort_by: Some("password_hash".to_string()),
            sort_order: Some("ASC".to_string()),
            ..ListQuery::default()
        };
        let filter = query.filter().unwrap();
        assert_eq!(filter.sort, RequestSort::CreatedAt);
        assert_eq!(filter.order, SortOrder::Asc);
    }

    #[test]
    fn test_unknown_donation_type_is_rejected() {
        let query = ListQuery {
            donation_type: Some("crypto".to_string()),
            ..ListQuery::default()
        };
        assert!(matches!(query.filter(), Err(AppError::BadRequest(_))));
    }

    #[test]
    fn test_urgency_is_case_insensitive() {
        assert_eq!(parse_urgency("high").unwrap(), Urgency::High);
    }
}
