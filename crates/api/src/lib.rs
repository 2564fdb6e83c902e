//! HTTP API layer for givehub.
//!
//! This crate provides the JSON API mounted under `/api`:
//!
//! - **Endpoints**: auth, donation requests, donations, stories, organizer and admin views
//! - **Extractors**: Authentication and pagination
//! - **Middleware**: Bearer token resolution and the admin guard
//!
//! Built on Axum 0.8 with Tower middleware stack.

pub mod endpoints;
pub mod extractors;
pub mod middleware;
pub mod response;

pub use endpoints::router;
pub use middleware::AppState;
