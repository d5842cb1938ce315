//! Full-stack REST API integration tests.
//!
//! Each test opens a real SQLite store in a tempdir, constructs the axum
//! Router, and sends actual HTTP requests via `tower::ServiceExt`. This
//! validates routing, serialisation, handler logic, and storage in one
//! pass. No LLM is configured, so every chat branch serves its
//! deterministic canned reply.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header::CONTENT_TYPE, Method, Request, StatusCode};
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt; // for `.oneshot()`

use otto_engine::config::AppConfig;
use otto_server::rest::create_router;
use otto_server::state::AppState;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn setup() -> (axum::Router, TempDir) {
    let tmp = TempDir::new().expect("tempdir");
    let config = AppConfig {
        data_dir: tmp.path().to_string_lossy().to_string(),
        ..Default::default()
    };
    let state = AppState::new(config).expect("state init");
    state.demo_user().await.expect("demo user");
    (create_router(Arc::new(state)), tmp)
}

fn json_request(method: Method, uri: &str, body: Option<Value>) -> Request<Body> {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json");
    match body {
        Some(val) => builder.body(Body::from(val.to_string())).unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn body_json(resp: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes)
        .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).to_string()))
}

async fn send(router: &axum::Router, request: Request<Body>) -> (StatusCode, Value) {
    let resp = router.clone().oneshot(request).await.unwrap();
    let status = resp.status();
    (status, body_json(resp).await)
}

// ---------------------------------------------------------------------------
// Health
// ---------------------------------------------------------------------------

#[tokio::test]
async fn health_endpoint_returns_ok() {
    let (router, _tmp) = setup().await;
    let (status, body) = send(&router, json_request(Method::GET, "/health", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");

    let (status, body) = send(&router, json_request(Method::GET, "/", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "AI Assistant Backend API");
}

// ---------------------------------------------------------------------------
// Tasks
// ---------------------------------------------------------------------------

#[tokio::test]
async fn task_crud_round_trip() {
    let (router, _tmp) = setup().await;

    let (status, created) = send(
        &router,
        json_request(
            Method::POST,
            "/api/tasks",
            Some(json!({
                "title": "Complete project proposal",
                "description": "Write and submit the Q1 project proposal",
                "priority": "high",
                "tags": ["work", "writing"],
                "category": "planning"
            })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["title"], "Complete project proposal");
    assert_eq!(created["priority"], "high");
    assert_eq!(created["status"], "todo");
    assert_eq!(created["ai_suggested"], false);

    let id = created["id"].as_str().unwrap();

    // Round-trip: the created resource is retrievable with identical fields.
    let (status, fetched) = send(
        &router,
        json_request(Method::GET, &format!("/api/tasks/{id}"), None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched, created);

    let (status, listed) = send(&router, json_request(Method::GET, "/api/tasks", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn task_partial_update_only_changes_specified_fields() {
    let (router, _tmp) = setup().await;

    let (_, created) = send(
        &router,
        json_request(
            Method::POST,
            "/api/tasks",
            Some(json!({
                "title": "Review code changes",
                "description": "Check the auth PR",
                "priority": "medium"
            })),
        ),
    )
    .await;
    let id = created["id"].as_str().unwrap();

    let (status, updated) = send(
        &router,
        json_request(
            Method::PUT,
            &format!("/api/tasks/{id}"),
            Some(json!({ "status": "completed" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["status"], "completed");
    assert!(!updated["completed_at"].is_null());
    // Unspecified fields survive the merge.
    assert_eq!(updated["title"], "Review code changes");
    assert_eq!(updated["description"], "Check the auth PR");
    assert_eq!(updated["priority"], "medium");

    // Reopening clears the completion timestamp.
    let (_, reopened) = send(
        &router,
        json_request(
            Method::PUT,
            &format!("/api/tasks/{id}"),
            Some(json!({ "status": "in_progress" })),
        ),
    )
    .await;
    assert_eq!(reopened["status"], "in_progress");
    assert!(reopened["completed_at"].is_null());
}

#[tokio::test]
async fn task_delete_then_get_returns_not_found() {
    let (router, _tmp) = setup().await;

    let (_, created) = send(
        &router,
        json_request(Method::POST, "/api/tasks", Some(json!({ "title": "ephemeral" }))),
    )
    .await;
    let id = created["id"].as_str().unwrap();

    let (status, body) = send(
        &router,
        json_request(Method::DELETE, &format!("/api/tasks/{id}"), None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Task deleted successfully");

    let (status, _) = send(
        &router,
        json_request(Method::GET, &format!("/api/tasks/{id}"), None),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(
        &router,
        json_request(Method::DELETE, &format!("/api/tasks/{id}"), None),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn task_list_filters_by_status() {
    let (router, _tmp) = setup().await;

    for title in ["a", "b"] {
        send(
            &router,
            json_request(Method::POST, "/api/tasks", Some(json!({ "title": title }))),
        )
        .await;
    }
    let (_, created) = send(
        &router,
        json_request(Method::POST, "/api/tasks", Some(json!({ "title": "c" }))),
    )
    .await;
    let id = created["id"].as_str().unwrap();
    send(
        &router,
        json_request(
            Method::PUT,
            &format!("/api/tasks/{id}"),
            Some(json!({ "status": "completed" })),
        ),
    )
    .await;

    let (status, todos) = send(
        &router,
        json_request(Method::GET, "/api/tasks?status=todo", None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(todos.as_array().unwrap().len(), 2);

    let (_, completed) = send(
        &router,
        json_request(Method::GET, "/api/tasks?status=completed", None),
    )
    .await;
    assert_eq!(completed.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn task_insights_and_suggestions_endpoints() {
    let (router, _tmp) = setup().await;

    let (status, insights) = send(
        &router,
        json_request(Method::GET, "/api/tasks/insights", None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(insights["total_tasks"], 0);

    let (_, created) = send(
        &router,
        json_request(Method::POST, "/api/tasks", Some(json!({ "title": "vague" }))),
    )
    .await;
    let id = created["id"].as_str().unwrap();

    let (status, body) = send(
        &router,
        json_request(Method::GET, &format!("/api/tasks/{id}/suggestions"), None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let suggestions = body["suggestions"].as_array().unwrap();
    assert!(suggestions
        .iter()
        .any(|s| s.as_str().unwrap().contains("due date")));
}

#[tokio::test]
async fn invalid_task_id_is_bad_request() {
    let (router, _tmp) = setup().await;
    let (status, _) = send(
        &router,
        json_request(Method::GET, "/api/tasks/not-a-uuid", None),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

// ---------------------------------------------------------------------------
// Calendar
// ---------------------------------------------------------------------------

#[tokio::test]
async fn calendar_event_crud_round_trip() {
    let (router, _tmp) = setup().await;

    let (status, created) = send(
        &router,
        json_request(
            Method::POST,
            "/api/calendar/events",
            Some(json!({
                "title": "Client Presentation",
                "description": "Present the Q4 roadmap",
                "start_at": "2030-06-01T10:00:00Z",
                "end_at": "2030-06-01T11:00:00Z",
                "location": "Main Conference Room",
                "attendees": ["client@example.com"]
            })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = created["id"].as_str().unwrap();

    let (status, fetched) = send(
        &router,
        json_request(Method::GET, &format!("/api/calendar/events/{id}"), None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched, created);

    let (_, updated) = send(
        &router,
        json_request(
            Method::PUT,
            &format!("/api/calendar/events/{id}"),
            Some(json!({ "location": "Boardroom" })),
        ),
    )
    .await;
    assert_eq!(updated["location"], "Boardroom");
    assert_eq!(updated["title"], "Client Presentation");

    let (status, _) = send(
        &router,
        json_request(Method::DELETE, &format!("/api/calendar/events/{id}"), None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(
        &router,
        json_request(Method::GET, &format!("/api/calendar/events/{id}"), None),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn calendar_upcoming_and_helpers() {
    let (router, _tmp) = setup().await;

    let (status, upcoming) = send(
        &router,
        json_request(Method::GET, "/api/calendar/upcoming", None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(upcoming["events"].as_array().unwrap().is_empty());
    assert!(upcoming["message"]
        .as_str()
        .unwrap()
        .contains("Google Calendar"));

    let (status, slots) = send(
        &router,
        json_request(Method::GET, "/api/calendar/free-slots?duration_minutes=30", None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(slots["slots"].as_array().unwrap().len(), 10);

    let (status, insights) = send(
        &router,
        json_request(Method::GET, "/api/calendar/insights", None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(insights["total_events_this_week"], 5);

    let (status, sync) = send(
        &router,
        json_request(Method::GET, "/api/calendar/sync", None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(sync["events_synced"], 0);
}

// ---------------------------------------------------------------------------
// Email
// ---------------------------------------------------------------------------

async fn create_email(router: &axum::Router, subject: &str, important: bool) -> Value {
    let (status, created) = send(
        router,
        json_request(
            Method::POST,
            "/api/email",
            Some(json!({
                "subject": subject,
                "sender": "manager@company.com",
                "recipient": "you@company.com",
                "body": "Please review before Friday.",
                "is_important": important,
                "received_at": "2026-01-05T09:00:00Z"
            })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    created
}

#[tokio::test]
async fn email_important_flag_double_toggle_restores_original() {
    let (router, _tmp) = setup().await;
    let created = create_email(&router, "Quarterly report", false).await;
    let id = created["id"].as_str().unwrap();

    let (status, once) = send(
        &router,
        json_request(Method::PATCH, &format!("/api/email/{id}/important"), None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(once["is_important"], true);

    let (_, twice) = send(
        &router,
        json_request(Method::PATCH, &format!("/api/email/{id}/important"), None),
    )
    .await;
    assert_eq!(twice["is_important"], false);
}

#[tokio::test]
async fn email_filters_and_read_marker() {
    let (router, _tmp) = setup().await;
    let first = create_email(&router, "Unread one", false).await;
    create_email(&router, "Important one", true).await;

    let (_, important) = send(
        &router,
        json_request(Method::GET, "/api/email?is_important=true", None),
    )
    .await;
    assert_eq!(important.as_array().unwrap().len(), 1);

    let id = first["id"].as_str().unwrap();
    let (_, marked) = send(
        &router,
        json_request(Method::PATCH, &format!("/api/email/{id}/read"), None),
    )
    .await;
    assert_eq!(marked["is_read"], true);

    let (_, unread) = send(
        &router,
        json_request(Method::GET, "/api/email?is_read=false", None),
    )
    .await;
    assert_eq!(unread.as_array().unwrap().len(), 1);
    assert_eq!(unread[0]["subject"], "Important one");
}

#[tokio::test]
async fn email_send_is_recorded_and_summary_reports_it() {
    let (router, _tmp) = setup().await;

    let (status, sent) = send(
        &router,
        json_request(
            Method::POST,
            "/api/email/send",
            Some(json!({
                "to": "client@example.com",
                "subject": "Proposal follow-up",
                "body": "Please confirm receipt of the proposal."
            })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(sent["message"], "Email sent successfully");

    let (_, listed) = send(&router, json_request(Method::GET, "/api/email", None)).await;
    assert_eq!(listed.as_array().unwrap().len(), 1);
    assert_eq!(listed[0]["recipient"], "client@example.com");

    let (status, summary) = send(
        &router,
        json_request(Method::GET, "/api/email/summary", None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(summary["total_emails"], 1);
    // "Please confirm" trips the action-keyword scan.
    assert_eq!(summary["action_required"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn email_reply_suggestions_need_an_existing_email() {
    let (router, _tmp) = setup().await;

    let missing = uuid::Uuid::now_v7();
    let (status, _) = send(
        &router,
        json_request(
            Method::POST,
            "/api/email/reply",
            Some(json!({ "email_id": missing.to_string() })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let created = create_email(&router, "Needs a reply", false).await;
    let (status, body) = send(
        &router,
        json_request(
            Method::POST,
            "/api/email/reply",
            Some(json!({ "email_id": created["id"] })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["suggested_replies"].as_array().unwrap().len(), 3);
}

// ---------------------------------------------------------------------------
// Chat
// ---------------------------------------------------------------------------

#[tokio::test]
async fn chat_send_without_llm_serves_canned_task_reply() {
    let (router, _tmp) = setup().await;

    let (status, reply) = send(
        &router,
        json_request(
            Method::POST,
            "/api/chat/send",
            Some(json!({ "content": "create a task to review the reports" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(reply["type"], "assistant");
    assert!(reply["content"]
        .as_str()
        .unwrap()
        .contains("manage your tasks"));
    assert_eq!(reply["suggestions"].as_array().unwrap().len(), 3);
    assert!(!reply["session_id"].as_str().unwrap().is_empty());
}

#[tokio::test]
async fn chat_history_is_scoped_to_session_and_oldest_first() {
    let (router, _tmp) = setup().await;

    for content in ["first message", "second message"] {
        let (status, _) = send(
            &router,
            json_request(
                Method::POST,
                "/api/chat/send",
                Some(json!({ "content": content, "session_id": "session-a" })),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }
    send(
        &router,
        json_request(
            Method::POST,
            "/api/chat/send",
            Some(json!({ "content": "unrelated", "session_id": "session-b" })),
        ),
    )
    .await;

    let (status, history) = send(
        &router,
        json_request(Method::GET, "/api/chat/history?session_id=session-a", None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(history["total"], 4); // 2 user + 2 assistant messages

    let messages = history["messages"].as_array().unwrap();
    assert_eq!(messages.len(), 4);
    assert_eq!(messages[0]["type"], "user");
    assert_eq!(messages[0]["content"], "first message");
    assert_eq!(messages[1]["type"], "assistant");
    assert!(messages
        .iter()
        .all(|m| m["session_id"] == "session-a"));
}

#[tokio::test]
async fn chat_clear_session_removes_only_that_session() {
    let (router, _tmp) = setup().await;

    send(
        &router,
        json_request(
            Method::POST,
            "/api/chat/send",
            Some(json!({ "content": "hello", "session_id": "session-a" })),
        ),
    )
    .await;
    send(
        &router,
        json_request(
            Method::POST,
            "/api/chat/send",
            Some(json!({ "content": "hello", "session_id": "session-b" })),
        ),
    )
    .await;

    let (status, cleared) = send(
        &router,
        json_request(Method::DELETE, "/api/chat/history/session-a", None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        cleared["message"],
        "Cleared 2 messages from session session-a"
    );

    let (_, remaining) = send(
        &router,
        json_request(Method::GET, "/api/chat/history", None),
    )
    .await;
    assert_eq!(remaining["total"], 2);
}

// ---------------------------------------------------------------------------
// Suggestions
// ---------------------------------------------------------------------------

#[tokio::test]
async fn suggestions_generate_list_dismiss_flow() {
    let (router, _tmp) = setup().await;

    let (status, generated) = send(
        &router,
        json_request(Method::POST, "/api/suggestions/generate", None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(generated["count"], 4);

    let (_, listed) = send(
        &router,
        json_request(Method::GET, "/api/suggestions", None),
    )
    .await;
    assert_eq!(listed["suggestions"].as_array().unwrap().len(), 4);

    let (_, tasks_only) = send(
        &router,
        json_request(Method::GET, "/api/suggestions?type=task", None),
    )
    .await;
    let task_suggestions = tasks_only["suggestions"].as_array().unwrap();
    assert_eq!(task_suggestions.len(), 1);

    let id = task_suggestions[0]["id"].as_str().unwrap();
    let (status, _) = send(
        &router,
        json_request(Method::DELETE, &format!("/api/suggestions/{id}"), None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    // Dismissed suggestions disappear from the default listing but remain
    // retrievable with include_dismissed.
    let (_, after) = send(
        &router,
        json_request(Method::GET, "/api/suggestions", None),
    )
    .await;
    assert_eq!(after["suggestions"].as_array().unwrap().len(), 3);

    let (_, with_dismissed) = send(
        &router,
        json_request(Method::GET, "/api/suggestions?include_dismissed=true", None),
    )
    .await;
    assert_eq!(with_dismissed["suggestions"].as_array().unwrap().len(), 4);
}

#[tokio::test]
async fn suggestion_accept_retires_it() {
    let (router, _tmp) = setup().await;
    send(
        &router,
        json_request(Method::POST, "/api/suggestions/generate", None),
    )
    .await;

    let (_, listed) = send(
        &router,
        json_request(Method::GET, "/api/suggestions?type=task", None),
    )
    .await;
    let id = listed["suggestions"][0]["id"].as_str().unwrap().to_string();

    let (status, accepted) = send(
        &router,
        json_request(Method::POST, &format!("/api/suggestions/{id}/accept"), None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(accepted["action_taken"], "Task created");

    let (_, after) = send(
        &router,
        json_request(Method::GET, "/api/suggestions?type=task", None),
    )
    .await;
    assert!(after["suggestions"].as_array().unwrap().is_empty());
}

// ---------------------------------------------------------------------------
// Search
// ---------------------------------------------------------------------------

#[tokio::test]
async fn search_web_serves_demo_results_without_key() {
    let (router, _tmp) = setup().await;

    let (status, body) = send(
        &router,
        json_request(Method::GET, "/api/search/web?q=rust+async", None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_results"], 3);
    assert!(body["results"][0]["title"]
        .as_str()
        .unwrap()
        .contains("rust async"));

    let (status, suggestions) = send(
        &router,
        json_request(Method::GET, "/api/search/suggestions?q=rust", None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(suggestions["suggestions"].as_array().unwrap().len(), 10);
}

// ---------------------------------------------------------------------------
// Voice
// ---------------------------------------------------------------------------

#[tokio::test]
async fn voice_transcribe_accepts_multipart_audio() {
    let (router, _tmp) = setup().await;

    let boundary = "otto-test-boundary";
    let body = format!(
        "--{boundary}\r\n\
         Content-Disposition: form-data; name=\"audio\"; filename=\"clip.wav\"\r\n\
         Content-Type: audio/wav\r\n\r\n\
         fake-audio-bytes\r\n\
         --{boundary}--\r\n"
    );
    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/voice/transcribe")
        .header(
            CONTENT_TYPE,
            format!("multipart/form-data; boundary={boundary}"),
        )
        .body(Body::from(body))
        .unwrap();

    let (status, body) = send(&router, request).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["text"].as_str().unwrap().contains("demo transcription"));
    assert_eq!(body["confidence"], 0.95);
}

#[tokio::test]
async fn voice_synthesize_and_voices() {
    let (router, _tmp) = setup().await;

    let (status, body) = send(
        &router,
        json_request(
            Method::POST,
            "/api/voice/synthesize",
            Some(json!({ "text": "Hello world" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["audio_url"], "/api/voice/audio/demo.mp3");
    assert_eq!(body["voice"], "alloy");

    let (status, voices) = send(
        &router,
        json_request(Method::GET, "/api/voice/voices", None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(voices["voices"].as_array().unwrap().len(), 6);
}

// ---------------------------------------------------------------------------
// Auth
// ---------------------------------------------------------------------------

#[tokio::test]
async fn auth_stubs_resolve_demo_identity() {
    let (router, _tmp) = setup().await;

    let (status, login) = send(
        &router,
        json_request(
            Method::POST,
            "/api/auth/login",
            Some(json!({ "email": "demo@example.com" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(login["access_token"], "demo_token");
    assert_eq!(login["token_type"], "bearer");

    let (status, me) = send(&router, json_request(Method::GET, "/api/auth/me", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["email"], "demo@example.com");
    assert_eq!(me["google_connected"], false);

    let (status, callback) = send(
        &router,
        json_request(
            Method::POST,
            "/api/auth/google/callback",
            Some(json!({ "code": "4/abc123" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(callback["message"], "Google authentication successful");

    let (_, me) = send(&router, json_request(Method::GET, "/api/auth/me", None)).await;
    assert_eq!(me["google_connected"], true);
}

// ---------------------------------------------------------------------------
// Notifications
// ---------------------------------------------------------------------------

#[tokio::test]
async fn notification_subscriptions_round_trip() {
    let (router, _tmp) = setup().await;

    let (status, subscription) = send(
        &router,
        json_request(
            Method::POST,
            "/api/notifications/subscribe",
            Some(json!({
                "endpoint": "https://push.example.com/sub/abc",
                "keys": { "p256dh": "pkey", "auth": "akey" }
            })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(subscription["endpoint"], "https://push.example.com/sub/abc");

    let (status, listed) = send(
        &router,
        json_request(Method::GET, "/api/notifications/subscriptions", None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed["subscriptions"].as_array().unwrap().len(), 1);

    let (status, notifications) = send(
        &router,
        json_request(Method::GET, "/api/notifications", None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(notifications["notifications"].as_array().unwrap().is_empty());

    let missing = uuid::Uuid::now_v7();
    let (status, _) = send(
        &router,
        json_request(
            Method::POST,
            &format!("/api/notifications/{missing}/read"),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
