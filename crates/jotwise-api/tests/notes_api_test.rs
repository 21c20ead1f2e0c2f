//! Router tests for session handling and note CRUD.

mod common;

use axum::http::StatusCode;
use serde_json::json;

use common::*;
use jotwise_inference::mock::MockStreamingBackend;

#[tokio::test]
async fn test_health_check() {
    let app = TestApp::new(MockStreamingBackend::new());
    let response = app.send(empty_request("GET", "/health", None)).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key("x-request-id"));
    assert_eq!(body_json(response).await["status"], "healthy");
}

#[tokio::test]
async fn test_notes_require_session() {
    let app = TestApp::new(MockStreamingBackend::new());

    let response = app.send(empty_request("GET", "/api/notes", None)).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(response).await["error"], "Authentication required");

    let response = app
        .send(empty_request("GET", "/api/notes", Some("stale-token")))
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_create_then_list_newest_first() {
    let app = TestApp::new(MockStreamingBackend::new());

    for title in ["First", "Second"] {
        let response = app
            .send(json_request(
                "POST",
                "/api/notes",
                Some(ALICE_TOKEN),
                json!({ "title": title, "content": "some tasks" }),
            ))
            .await;
        assert_eq!(response.status(), StatusCode::CREATED);
        tokio::time::sleep(std::time::Duration::from_millis(2)).await;
    }

    let response = app
        .send(empty_request("GET", "/api/notes", Some(ALICE_TOKEN)))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let notes = body_json(response).await;
    let titles: Vec<&str> = notes
        .as_array()
        .unwrap()
        .iter()
        .map(|n| n["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, vec!["Second", "First"]);
    assert!(notes[0]["summary"].is_null());
}

#[tokio::test]
async fn test_create_validates_input() {
    let app = TestApp::new(MockStreamingBackend::new());

    let response = app
        .send(json_request(
            "POST",
            "/api/notes",
            Some(ALICE_TOKEN),
            json!({ "title": "Todo", "content": "  " }),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"], "Content is required");

    let response = app
        .send(json_request(
            "POST",
            "/api/notes",
            Some(ALICE_TOKEN),
            json!({ "title": "x".repeat(201), "content": "body" }),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_other_users_note_is_not_found() {
    let app = TestApp::new(MockStreamingBackend::new());
    let note = app.seed_note(alice(), "private").await;
    let uri = format!("/api/notes/{}", note.id);

    let response = app.send(empty_request("GET", &uri, Some(BOB_TOKEN))).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app
        .send(empty_request("DELETE", &uri, Some(BOB_TOKEN)))
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app.send(empty_request("GET", &uri, Some(ALICE_TOKEN))).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_update_summary_and_delete() {
    let app = TestApp::new(MockStreamingBackend::new());
    let note = app.seed_note(alice(), "call bank").await;

    let response = app
        .send(json_request(
            "PATCH",
            &format!("/api/notes/{}", note.id),
            Some(ALICE_TOKEN),
            json!({ "content": "call bank today" }),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["content"], "call bank today");

    let response = app
        .send(json_request(
            "PUT",
            &format!("/api/notes/{}/summary", note.id),
            Some(ALICE_TOKEN),
            json!({ "summary": "done" }),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["summary"], "done");

    let response = app
        .send(empty_request(
            "DELETE",
            &format!("/api/notes/{}", note.id),
            Some(ALICE_TOKEN),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn test_rate_limit_rejects_excess_requests() {
    let backend = MockStreamingBackend::new();
    let base = TestApp::new(backend.clone());
    let state = base
        .state
        .clone()
        .with_rate_limiter(Some(jotwise_api::config::build_rate_limiter(1, 60).unwrap()));
    let app = TestApp::with_state(state, base.notes.clone(), backend);

    let first = app
        .send(empty_request("GET", "/api/notes", Some(ALICE_TOKEN)))
        .await;
    assert_eq!(first.status(), StatusCode::OK);

    let second = app
        .send(empty_request("GET", "/api/notes", Some(ALICE_TOKEN)))
        .await;
    assert_eq!(second.status(), StatusCode::TOO_MANY_REQUESTS);

    // Health is outside the limited routes.
    let health = app.send(empty_request("GET", "/health", None)).await;
    assert_eq!(health.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_openapi_document_lists_routes() {
    let app = TestApp::new(MockStreamingBackend::new());
    let response = app.send(empty_request("GET", "/openapi.json", None)).await;
    assert_eq!(response.status(), StatusCode::OK);

    let doc = body_json(response).await;
    assert!(doc["paths"]["/api/notes"].is_object());
    assert!(doc["paths"]["/api/notes/{id}/enhance"]["post"].is_object());
    assert!(doc["paths"]["/api/summarize"]["post"].is_object());
}
