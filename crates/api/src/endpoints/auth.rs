//! Authentication endpoints.

use axum::{
    Json, Router,
    extract::State,
    routing::{get, post},
};
use givehub_common::AppResult;
use givehub_core::{AuthSession, RegisterInput, SignInInput};
use givehub_db::entities::user;

use crate::{extractors::AuthUser, middleware::AppState, response::ApiResponse};

/// Create an account and sign it in.
async fn register(
    State(state): State<AppState>,
    Json(input): Json<RegisterInput>,
) -> AppResult<ApiResponse<AuthSession>> {
    let session = state.user_service.register(input).await?;
    Ok(ApiResponse::created(session))
}

/// Exchange credentials for a fresh token.
async fn signin(
    State(state): State<AppState>,
    Json(input): Json<SignInInput>,
) -> AppResult<ApiResponse<AuthSession>> {
    let session = state.user_service.sign_in(input).await?;
    Ok(ApiResponse::ok(session))
}

/// The signed-in user.
async fn me(AuthUser(user): AuthUser) -> ApiResponse<user::Model> {
    ApiResponse::ok(user)
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/signin", post(signin))
        .route("/me", get(me))
}
