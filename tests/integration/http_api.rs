//! Integration tests for the HTTP API client.
//!
//! Runs `HttpApi` against a `wiremock` server to check request paths,
//! bodies, and how responses map onto `ApiError`.
//!
//! Verification command: `cargo test --test http_api`

#![allow(clippy::expect_used, clippy::unwrap_used)]

use std::time::Duration;

use serde_json::json;
use url::Url;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use zendo::api::http::HttpApi;
use zendo::api::{ApiError, ChatApi, TaskApi};
use zendo_proto::chat::{ConversationId, NO_RESPONSE_FALLBACK};
use zendo_proto::identity::UserId;
use zendo_proto::task::{Priority, TaskId, TaskStatus};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn user() -> UserId {
    UserId::new("User")
}

fn client_for(server: &MockServer) -> HttpApi {
    HttpApi::new(
        Url::parse(&server.uri()).unwrap(),
        Duration::from_secs(5),
        Duration::from_secs(5),
    )
}

// ---------------------------------------------------------------------------
// GET /api/{user}/tasks
// ---------------------------------------------------------------------------

#[tokio::test]
async fn list_tasks_decodes_full_records() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/User/tasks"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {
                "id": 1,
                "title": "Buy groceries",
                "description": "Milk",
                "status": "To Do",
                "priority": "High",
                "due_date": "2025-03-01"
            },
            {
                "id": 2,
                "title": "Ship it",
                "status": "In Progress",
                "priority": null,
                "due_date": "2025-03-02T00:00:00"
            },
            { "id": 3, "title": "Odd", "status": "Blocked" }
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let tasks = client_for(&server).list_tasks(&user()).await.unwrap();

    assert_eq!(tasks.len(), 3);
    assert_eq!(tasks[0].id, TaskId::new(1));
    assert_eq!(tasks[0].description.as_deref(), Some("Milk"));
    assert_eq!(tasks[0].priority, Priority::High);
    assert_eq!(tasks[1].priority, Priority::Medium);
    assert_eq!(
        tasks[1].due_date.map(|d| d.to_string()).as_deref(),
        Some("2025-03-02")
    );
    assert_eq!(tasks[2].status(), None);
    assert_eq!(tasks[2].status_label, "Blocked");
}

#[tokio::test]
async fn list_tasks_non_2xx_is_status_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/User/tasks"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let err = client_for(&server).list_tasks(&user()).await.unwrap_err();
    assert_eq!(err, ApiError::Status(503));
    assert!(err.is_transport());
}

#[tokio::test]
async fn list_tasks_bad_json_is_malformed() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/User/tasks"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let err = client_for(&server).list_tasks(&user()).await.unwrap_err();
    assert!(matches!(err, ApiError::MalformedResponse(_)));
    assert!(!err.is_transport());
}

// ---------------------------------------------------------------------------
// PATCH /api/{user}/tasks/{id}
// ---------------------------------------------------------------------------

#[tokio::test]
async fn patch_sends_status_label() {
    let server = MockServer::start().await;
    Mock::given(method("PATCH"))
        .and(path("/api/User/tasks/42"))
        .and(body_json(json!({ "status": "In Progress" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": 42 })))
        .expect(1)
        .mount(&server)
        .await;

    client_for(&server)
        .patch_task_status(&user(), TaskId::new(42), TaskStatus::InProgress)
        .await
        .unwrap();
}

#[tokio::test]
async fn patch_rejection_is_status_error() {
    let server = MockServer::start().await;
    Mock::given(method("PATCH"))
        .and(path("/api/User/tasks/9"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .patch_task_status(&user(), TaskId::new(9), TaskStatus::Done)
        .await
        .unwrap_err();
    assert_eq!(err, ApiError::Status(404));
}

// ---------------------------------------------------------------------------
// POST /api/{user}/chat
// ---------------------------------------------------------------------------

#[tokio::test]
async fn first_chat_sends_null_conversation() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/User/chat"))
        .and(body_json(json!({
            "message": "Add a task to buy groceries",
            "conversation_id": null
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "conversation_id": 42,
            "response": "Added!",
            "tool_calls": [{ "tool": "add_task", "args": { "title": "buy groceries" } }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let reply = client_for(&server)
        .send_message(&user(), "Add a task to buy groceries", None)
        .await
        .unwrap();

    assert_eq!(reply.conversation_id, Some(ConversationId::new(42)));
    assert_eq!(reply.text(), "Added!");
    assert_eq!(reply.tool_calls()[0].name, "add_task");
}

#[tokio::test]
async fn follow_up_chat_carries_conversation_id() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/User/chat"))
        .and(body_json(json!({ "message": "and milk", "conversation_id": 42 })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "conversation_id": 42,
            "response": ""
        })))
        .expect(1)
        .mount(&server)
        .await;

    let reply = client_for(&server)
        .send_message(&user(), "and milk", Some(ConversationId::new(42)))
        .await
        .unwrap();
    assert_eq!(reply.text(), NO_RESPONSE_FALLBACK);
    assert!(reply.tool_calls().is_empty());
}

#[tokio::test]
async fn chat_server_error_is_status_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/User/chat"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .send_message(&user(), "hello", None)
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "server error: 500");
}
