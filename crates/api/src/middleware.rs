//! API middleware.

use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{Request, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use givehub_common::AppError;
use givehub_core::{
    DonationRequestService, DonationService, ModerationService, StorageService, StoryService,
    UserService,
};
use givehub_db::{entities::user, repositories::UserRepository};
use sea_orm::DatabaseConnection;

/// Application state.
#[derive(Clone)]
pub struct AppState {
    pub user_service: UserService,
    pub request_service: DonationRequestService,
    pub donation_service: DonationService,
    pub moderation_service: ModerationService,
    pub story_service: StoryService,
}

impl AppState {
    /// Wire every service onto one connection pool and media store.
    #[must_use]
    pub fn new(db: Arc<DatabaseConnection>, storage: StorageService) -> Self {
        Self {
            user_service: UserService::new(UserRepository::new(Arc::clone(&db))),
            request_service: DonationRequestService::new(Arc::clone(&db)),
            donation_service: DonationService::new(Arc::clone(&db)),
            moderation_service: ModerationService::new(Arc::clone(&db)),
            story_service: StoryService::new(db, storage),
        }
    }
}

/// Authentication middleware.
///
/// Resolves `Authorization: Bearer <token>` into a [`user::Model`] request
/// extension. Requests without a valid token continue anonymously; the
/// extractors decide whether that is acceptable.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    if let Some(auth_header) = req.headers().get(header::AUTHORIZATION)
        && let Ok(auth_str) = auth_header.to_str()
        && let Some(token) = auth_str.strip_prefix("Bearer ")
    {
        match state.user_service.authenticate_by_token(token.trim()).await {
            Ok(user) => {
                req.extensions_mut().insert(user);
            }
            Err(e) if e.is_server_error() => return e.into_response(),
            Err(_) => tracing::debug!("Ignoring invalid bearer token"),
        }
    }

    next.run(req).await
}

/// Route guard for admin-only routers.
pub async fn require_admin(req: Request<Body>, next: Next) -> Response {
    match req.extensions().get::<user::Model>() {
        None => AppError::Unauthorized.into_response(),
        Some(user) if user.role != user::UserRole::Admin => {
            AppError::Forbidden("Admin access required".to_string()).into_response()
        }
        Some(_) => next.run(req).await,
    }
}
