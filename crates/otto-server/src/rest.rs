use std::sync::Arc;

use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{HeaderValue, Method, StatusCode};
use axum::routing::{delete, get, patch, post};
use axum::{Json, Router};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use otto_core::OttoError;

use crate::state::AppState;

#[path = "rest/auth.rs"]
mod auth;
#[path = "rest/calendar.rs"]
mod calendar;
#[path = "rest/chat.rs"]
mod chat;
#[path = "rest/email.rs"]
mod email;
#[path = "rest/notifications.rs"]
mod notifications;
#[path = "rest/search.rs"]
mod search;
#[path = "rest/suggestions.rs"]
mod suggestions;
#[path = "rest/tasks.rs"]
mod tasks;
#[path = "rest/voice.rs"]
mod voice;

pub fn create_router(state: Arc<AppState>) -> Router {
    let cors = cors_layer(&state.config.server.cors_origins);

    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        // Tasks
        .route("/api/tasks", post(tasks::create_task).get(tasks::list_tasks))
        .route("/api/tasks/insights", get(tasks::task_insights))
        .route(
            "/api/tasks/:id",
            get(tasks::get_task)
                .put(tasks::update_task)
                .delete(tasks::delete_task),
        )
        .route("/api/tasks/:id/suggestions", get(tasks::task_suggestions))
        // Calendar
        .route(
            "/api/calendar/events",
            get(calendar::list_events).post(calendar::create_event),
        )
        .route(
            "/api/calendar/events/:id",
            get(calendar::get_event)
                .put(calendar::update_event)
                .delete(calendar::delete_event),
        )
        .route("/api/calendar/upcoming", get(calendar::upcoming_events))
        .route("/api/calendar/free-slots", get(calendar::free_slots))
        .route("/api/calendar/suggest-times", get(calendar::suggest_times))
        .route("/api/calendar/insights", get(calendar::calendar_insights))
        .route("/api/calendar/sync", get(calendar::sync_calendar))
        // Email
        .route("/api/email", get(email::list_emails).post(email::create_email))
        .route("/api/email/recent", get(email::recent_emails))
        .route("/api/email/summary", get(email::email_summary))
        .route("/api/email/insights", get(email::email_insights))
        .route("/api/email/reply", post(email::suggest_reply))
        .route("/api/email/send", post(email::send_email))
        .route("/api/email/sync", get(email::sync_gmail))
        .route(
            "/api/email/:id",
            get(email::get_email)
                .put(email::update_email)
                .delete(email::delete_email),
        )
        .route("/api/email/:id/read", patch(email::mark_read))
        .route("/api/email/:id/important", patch(email::toggle_important))
        // Chat
        .route("/api/chat/send", post(chat::send_message))
        .route("/api/chat/history", get(chat::chat_history))
        .route("/api/chat/history/:session_id", delete(chat::clear_history))
        // Search
        .route("/api/search/web", get(search::search_web))
        .route("/api/search/suggestions", get(search::search_suggestions))
        // Suggestions
        .route("/api/suggestions", get(suggestions::list_suggestions))
        .route("/api/suggestions/generate", post(suggestions::generate_suggestions))
        .route("/api/suggestions/:id/accept", post(suggestions::accept_suggestion))
        .route("/api/suggestions/:id", delete(suggestions::dismiss_suggestion))
        // Voice
        .route("/api/voice/transcribe", post(voice::transcribe_audio))
        .route("/api/voice/synthesize", post(voice::synthesize_speech))
        .route("/api/voice/voices", get(voice::list_voices))
        // Auth
        .route("/api/auth/login", post(auth::login))
        .route("/api/auth/google/login", get(auth::google_login))
        .route("/api/auth/google/callback", post(auth::google_callback))
        .route("/api/auth/me", get(auth::current_user))
        // Notifications
        .route("/api/notifications", get(notifications::list_notifications))
        .route(
            "/api/notifications/:id/read",
            post(notifications::mark_notification_read),
        )
        .route(
            "/api/notifications/subscribe",
            post(notifications::subscribe),
        )
        .route(
            "/api/notifications/subscriptions",
            get(notifications::list_subscriptions),
        )
        .route(
            "/api/notifications/subscriptions/:id",
            delete(notifications::unsubscribe),
        )
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// CORS restricted to the desktop-shell origins plus configured extras.
fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| o.parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION])
        .allow_credentials(true)
}

async fn root() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "message": "AI Assistant Backend API" }))
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "healthy" }))
}

pub(crate) fn map_otto_error(err: OttoError) -> (StatusCode, String) {
    match err {
        OttoError::NotFound(_, _) => (StatusCode::NOT_FOUND, err.to_string()),
        OttoError::InvalidInput(_) => (StatusCode::BAD_REQUEST, err.to_string()),
        _ => (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()),
    }
}

pub(crate) fn parse_uuid_param(raw: &str, what: &str) -> Result<Uuid, (StatusCode, String)> {
    Uuid::parse_str(raw).map_err(|_| {
        (
            StatusCode::BAD_REQUEST,
            format!("invalid {what}: {raw}"),
        )
    })
}
