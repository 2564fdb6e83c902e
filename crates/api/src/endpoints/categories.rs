//! Category listing.

use axum::{Router, extract::State, routing::get};
use givehub_common::AppResult;
use givehub_db::entities::category;

use crate::{middleware::AppState, response::ApiResponse};

async fn list(State(state): State<AppState>) -> AppResult<ApiResponse<Vec<category::Model>>> {
    let categories = state.request_service.categories().await?;
    Ok(ApiResponse::ok(categories))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(list))
}
