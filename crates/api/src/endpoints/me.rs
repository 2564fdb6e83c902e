//! The signed-in donor's own records.

use axum::{
    Router,
    extract::{Query, State},
    routing::get,
};
use givehub_common::AppResult;
use givehub_db::entities::donation;

use crate::{
    extractors::{AuthUser, PageQuery},
    middleware::AppState,
    response::Paginated,
};

async fn donations(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> AppResult<Paginated<donation::Model>> {
    let page = state
        .donation_service
        .my_donations(&user, query.page(), query.per_page())
        .await?;
    Ok(Paginated::new(page, &query))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/donations", get(donations))
}
