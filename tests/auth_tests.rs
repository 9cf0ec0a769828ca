//! Registration validation and token gate tests. Everything here is
//! rejected before the first query, so no database is needed.

mod common;

use axum::http::StatusCode;
use common::{TestApp, json_request};
use serde_json::json;
use uuid::Uuid;

#[tokio::test]
async fn test_register_rejects_short_username() {
    let app = TestApp::new();

    let (status, body) = json_request(
        &app.router,
        "POST",
        "/api/auth/register",
        Some(json!({"username": "ab", "password": "long-enough-password"})),
        None,
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], 400);
    assert!(body["error"].as_str().unwrap().contains("username"));
}

#[tokio::test]
async fn test_register_rejects_short_password() {
    let app = TestApp::new();

    let (status, body) = json_request(
        &app.router,
        "POST",
        "/api/auth/register",
        Some(json!({"username": "alice", "password": "short"})),
        None,
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("password"));
}

#[tokio::test]
async fn test_register_rejects_missing_fields() {
    let app = TestApp::new();

    let (status, _) = json_request(
        &app.router,
        "POST",
        "/api/auth/register",
        Some(json!({"username": "alice"})),
        None,
    )
    .await;

    // Json extractor rejection, not our validator.
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_logout_requires_auth() {
    let app = TestApp::new();

    let (status, body) =
        json_request(&app.router, "POST", "/api/auth/logout", None, None).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["status"], 401);
}

#[tokio::test]
async fn test_garbage_bearer_token_is_unauthorized() {
    let app = TestApp::new();

    let (status, _) = json_request(
        &app.router,
        "POST",
        "/api/auth/logout",
        None,
        Some("not-a-jwt"),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_token_signed_with_wrong_secret_is_unauthorized() {
    let app = TestApp::new();

    // Well-formed claims, wrong key: signature verification must fail
    // before anything else happens.
    let (token, _) = askboard::auth::Claims::new(
        Uuid::new_v4(),
        "mallory".to_string(),
        "some-other-secret",
    )
    .expect("encode");

    let (status, body) = json_request(
        &app.router,
        "POST",
        "/api/auth/logout",
        None,
        Some(&token),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Invalid token");
}
