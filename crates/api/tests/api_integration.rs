//! API integration tests.
//!
//! Requests go through the full router, the auth middleware and the
//! services, backed by a mock database.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode, header},
    middleware::from_fn_with_state,
};
use givehub_api::{AppState, middleware::auth_middleware, router as api_router};
use givehub_core::MemoryStorage;
use givehub_db::{
    entities::{donation_request::RequestStatus, user::UserRole},
    test_utils::{category_model, request_model, user_model},
};
use sea_orm::{DatabaseBackend, MockDatabase, Value};
use serde_json::Value as Json;
use tower::ServiceExt;

/// Build the app the way the server does, over the given mock database.
fn create_test_router(db: MockDatabase) -> Router {
    let state = AppState::new(
        Arc::new(db.into_connection()),
        Arc::new(MemoryStorage::new("/storage")),
    );

    Router::new()
        .nest("/api", api_router())
        .layer(from_fn_with_state(state.clone(), auth_middleware))
        .with_state(state)
}

fn empty_db() -> MockDatabase {
    MockDatabase::new(DatabaseBackend::Postgres)
}

fn count_row(total: i64) -> BTreeMap<&'static str, Value> {
    BTreeMap::from([("num_items", Value::from(total))])
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn get_as(uri: &str, token: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap()
}

fn post_json(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .method("POST")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> Json {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_health_endpoint() {
    let app = create_test_router(empty_db());

    let response = app.oneshot(get("/api/health")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_unknown_endpoint_returns_404() {
    let app = create_test_router(empty_db());

    let response = app.oneshot(get("/api/nonexistent")).await.unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_categories_are_public() {
    let app = create_test_router(empty_db().append_query_results([[
        category_model(1, "Medical"),
        category_model(2, "Education"),
    ]]));

    let response = app.oneshot(get("/api/categories")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 2);
    assert_eq!(body["data"][0]["name"], "Medical");
}

#[tokio::test]
async fn test_register_validation_lists_fields() {
    let app = create_test_router(empty_db());

    let response = app
        .oneshot(post_json(
            "/api/auth/register",
            r#"{"email":"not-an-email","password":"short","name":"Ada","role":"DONOR"}"#,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = body_json(response).await;
    assert!(body["errors"]["email"].is_array());
    assert!(body["errors"]["password"].is_array());
}

#[tokio::test]
async fn test_me_requires_token() {
    let app = create_test_router(empty_db());

    let response = app.oneshot(get("/api/auth/me")).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_unknown_token_is_unauthorized() {
    let app = create_test_router(
        empty_db().append_query_results([Vec::<givehub_db::entities::user::Model>::new()]),
    );

    let response = app
        .oneshot(get_as("/api/auth/me", "token-nobody"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_me_returns_the_token_owner() {
    let app = create_test_router(
        empty_db().append_query_results([[user_model("d1", UserRole::Donor)]]),
    );

    let response = app
        .oneshot(get_as("/api/auth/me", "token-d1"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"]["id"], "d1");
    assert!(body["data"].get("password_hash").is_none());
}

#[tokio::test]
async fn test_admin_routes_reject_anonymous() {
    let app = create_test_router(empty_db());

    let response = app.oneshot(get("/api/admin/stats")).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_admin_routes_reject_donors() {
    let app = create_test_router(
        empty_db().append_query_results([[user_model("d1", UserRole::Donor)]]),
    );

    let response = app
        .oneshot(get_as("/api/admin/stats", "token-d1"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_donation_request_list_is_paginated() {
    let app = create_test_router(
        empty_db()
            .append_query_results([[count_row(1)]])
            .append_query_results([[request_model("r1", "o1", RequestStatus::Approved)]]),
    );

    let response = app
        .oneshot(get("/api/donation-requests?page=1&per_page=10"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["total"], 1);
    assert_eq!(body["per_page"], 10);
    assert_eq!(body["current_page"], 1);
    assert_eq!(body["last_page"], 1);
    assert_eq!(body["data"][0]["id"], "r1");
    assert!(body["data"][0]["progress"].is_object());
}

#[tokio::test]
async fn test_unknown_donation_type_filter_is_rejected() {
    let app = create_test_router(empty_db());

    let response = app
        .oneshot(get("/api/donation-requests?donation_type=crypto"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_pending_request_is_hidden_from_anonymous_viewers() {
    let app = create_test_router(
        empty_db().append_query_results([[request_model("r1", "o1", RequestStatus::Pending)]]),
    );

    let response = app
        .oneshot(get("/api/donation-requests/r1/progress"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_organizer_cannot_donate() {
    let app = create_test_router(
        empty_db().append_query_results([[user_model("o1", UserRole::Organizer)]]),
    );

    let request = Request::builder()
        .uri("/api/donation-requests/r1/donations")
        .method("POST")
        .header(header::AUTHORIZATION, "Bearer token-o1")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(r#"{"amount":100}"#))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_story_stats_reject_unknown_time_range() {
    let app = create_test_router(
        empty_db().append_query_results([[user_model("o1", UserRole::Organizer)]]),
    );

    let response = app
        .oneshot(get_as("/api/organizer/stats?time_range=decade", "token-o1"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
