//! API endpoints.

mod admin;
mod auth;
mod categories;
mod donation_requests;
mod health;
mod me;
mod organizer;
mod stories;

use axum::Router;

use crate::middleware::AppState;

/// Create the API router.
pub fn router() -> Router<AppState> {
    Router::new()
        .merge(health::router())
        .nest("/auth", auth::router())
        .nest("/categories", categories::router())
        .nest("/donation-requests", donation_requests::router())
        .nest("/me", me::router())
        .nest("/organizer", organizer::router())
        .nest("/admin", admin::router())
        .nest("/stories", stories::router())
}
