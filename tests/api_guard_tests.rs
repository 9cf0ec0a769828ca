//! Every mutating route sits behind the bearer gate; these tests confirm
//! each one turns anonymous requests away with 401 and a JSON error body,
//! and that malformed identifiers never reach a handler. Nothing here
//! touches the database.

mod common;

use axum::http::StatusCode;
use common::{TestApp, json_request};
use serde_json::json;
use uuid::Uuid;

#[tokio::test]
async fn test_create_question_requires_auth() {
    let app = TestApp::new();

    let (status, body) = json_request(
        &app.router,
        "POST",
        "/api/questions",
        Some(json!({"title": "How do I?", "content": "Details.", "tags": []})),
        None,
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["status"], 401);
}

#[tokio::test]
async fn test_edit_question_requires_auth() {
    let app = TestApp::new();
    let id = Uuid::new_v4();

    let (get_status, _) = json_request(
        &app.router,
        "GET",
        &format!("/api/questions/{id}/edit"),
        None,
        None,
    )
    .await;
    assert_eq!(get_status, StatusCode::UNAUTHORIZED);

    let (put_status, _) = json_request(
        &app.router,
        "PUT",
        &format!("/api/questions/{id}"),
        Some(json!({"title": "Edited", "content": "Edited.", "tags": []})),
        None,
    )
    .await;
    assert_eq!(put_status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_deletes_require_auth() {
    let app = TestApp::new();
    let id = Uuid::new_v4();

    for uri in [
        format!("/api/questions/{id}"),
        format!("/api/answers/{id}"),
        format!("/api/comments/{id}"),
    ] {
        let (status, body) = json_request(&app.router, "DELETE", &uri, None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{uri}");
        assert_eq!(body["status"], 401);
    }
}

#[tokio::test]
async fn test_reply_requires_auth() {
    let app = TestApp::new();
    let id = Uuid::new_v4();

    let (status, _) = json_request(
        &app.router,
        "POST",
        &format!("/api/questions/{id}/replies"),
        Some(json!({"content": "An answer."})),
        None,
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_votes_require_auth() {
    let app = TestApp::new();
    let id = Uuid::new_v4();

    for uri in [
        format!("/api/questions/{id}/vote"),
        format!("/api/answers/{id}/vote"),
    ] {
        let (status, _) = json_request(
            &app.router,
            "POST",
            &uri,
            Some(json!({"value": 1})),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{uri}");
    }
}

#[tokio::test]
async fn test_comment_edit_requires_auth() {
    let app = TestApp::new();
    let qid = Uuid::new_v4();
    let aid = Uuid::new_v4();

    // Both the comment form and the answer-as-comment (nil id) form.
    for cid in [Uuid::new_v4(), Uuid::nil()] {
        let uri = format!("/api/questions/{qid}/answers/{aid}/comments/{cid}/edit");
        let (status, _) = json_request(&app.router, "GET", &uri, None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{uri}");

        let uri = format!("/api/questions/{qid}/answers/{aid}/comments/{cid}");
        let (status, _) = json_request(
            &app.router,
            "PUT",
            &uri,
            Some(json!({"content": "Edited."})),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{uri}");
    }
}

#[tokio::test]
async fn test_profile_routes_require_auth() {
    let app = TestApp::new();
    let id = Uuid::new_v4();

    let (view_status, _) = json_request(
        &app.router,
        "GET",
        &format!("/api/users/{id}/profile"),
        None,
        None,
    )
    .await;
    assert_eq!(view_status, StatusCode::UNAUTHORIZED);

    let (photo_status, _) = json_request(
        &app.router,
        "POST",
        &format!("/api/users/{id}/profile/photo"),
        None,
        None,
    )
    .await;
    assert_eq!(photo_status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_malformed_question_id_is_a_bad_request() {
    let app = TestApp::new();

    let (status, _) = json_request(
        &app.router,
        "GET",
        "/api/questions/not-a-uuid",
        None,
        None,
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_unknown_route_is_not_found() {
    let app = TestApp::new();

    let (status, _) = json_request(&app.router, "GET", "/api/nothing-here", None, None).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}
