use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::Deserialize;

use otto_core::{EmailFilter, EmailMessage, EmailStore, EmailUpdate};
use otto_engine::actions::EmailDraft;

use crate::rest::{map_otto_error, parse_uuid_param};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / Response types
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
pub struct CreateEmailRequest {
    pub subject: String,
    pub sender: String,
    pub recipient: String,
    pub body: String,
    #[serde(default)]
    pub is_important: bool,
    pub received_at: DateTime<Utc>,
}

#[derive(Deserialize)]
pub struct ListEmailsQuery {
    pub is_read: Option<bool>,
    pub is_important: Option<bool>,
    #[serde(default = "default_limit")]
    pub limit: usize,
    #[serde(default)]
    pub offset: usize,
}

fn default_limit() -> usize {
    50
}

#[derive(Deserialize)]
pub struct RecentQuery {
    #[serde(default = "default_recent_limit")]
    pub limit: usize,
    #[serde(default)]
    pub unread_only: bool,
}

fn default_recent_limit() -> usize {
    10
}

#[derive(Deserialize)]
pub struct SummaryQuery {
    #[serde(default = "default_days_back")]
    pub days_back: i64,
}

fn default_days_back() -> i64 {
    7
}

#[derive(Deserialize)]
pub struct SuggestReplyRequest {
    pub email_id: String,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/email
pub async fn create_email(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateEmailRequest>,
) -> Result<(StatusCode, Json<EmailMessage>), (StatusCode, String)> {
    let mut email = EmailMessage::new(
        req.subject,
        req.sender,
        req.recipient,
        req.body,
        req.received_at,
    );
    if req.is_important {
        email = email.important();
    }

    state
        .store
        .insert_email(&email)
        .await
        .map_err(map_otto_error)?;

    Ok((StatusCode::CREATED, Json(email)))
}

/// GET /api/email
pub async fn list_emails(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListEmailsQuery>,
) -> Result<Json<Vec<EmailMessage>>, (StatusCode, String)> {
    let filter = EmailFilter {
        is_read: query.is_read,
        is_important: query.is_important,
    };

    let emails = state
        .store
        .list_emails(&filter, query.limit, query.offset)
        .await
        .map_err(map_otto_error)?;

    Ok(Json(emails))
}

/// GET /api/email/recent
pub async fn recent_emails(
    State(state): State<Arc<AppState>>,
    Query(query): Query<RecentQuery>,
) -> Result<Json<Vec<EmailMessage>>, (StatusCode, String)> {
    let filter = EmailFilter {
        is_read: query.unread_only.then_some(false),
        is_important: None,
    };

    let emails = state
        .store
        .list_emails(&filter, query.limit, 0)
        .await
        .map_err(map_otto_error)?;

    Ok(Json(emails))
}

/// GET /api/email/:id
pub async fn get_email(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<EmailMessage>, (StatusCode, String)> {
    let id = parse_uuid_param(&id, "email id")?;

    let email = state
        .store
        .get_email(id)
        .await
        .map_err(map_otto_error)?
        .ok_or((StatusCode::NOT_FOUND, "Email message not found".into()))?;

    Ok(Json(email))
}

/// PUT /api/email/:id — partial field merge.
pub async fn update_email(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(update): Json<EmailUpdate>,
) -> Result<Json<EmailMessage>, (StatusCode, String)> {
    let id = parse_uuid_param(&id, "email id")?;

    let mut email = state
        .store
        .get_email(id)
        .await
        .map_err(map_otto_error)?
        .ok_or((StatusCode::NOT_FOUND, "Email message not found".into()))?;

    email.apply(update);

    state
        .store
        .update_email(&email)
        .await
        .map_err(map_otto_error)?;

    Ok(Json(email))
}

/// DELETE /api/email/:id
pub async fn delete_email(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, (StatusCode, String)> {
    let id = parse_uuid_param(&id, "email id")?;

    let deleted = state
        .store
        .delete_email(id)
        .await
        .map_err(map_otto_error)?;

    if !deleted {
        return Err((StatusCode::NOT_FOUND, "Email message not found".into()));
    }

    Ok(Json(serde_json::json!({ "message": "Email message deleted successfully" })))
}

/// PATCH /api/email/:id/read
pub async fn mark_read(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<EmailMessage>, (StatusCode, String)> {
    let id = parse_uuid_param(&id, "email id")?;

    let mut email = state
        .store
        .get_email(id)
        .await
        .map_err(map_otto_error)?
        .ok_or((StatusCode::NOT_FOUND, "Email message not found".into()))?;

    email.is_read = true;

    state
        .store
        .update_email(&email)
        .await
        .map_err(map_otto_error)?;

    Ok(Json(email))
}

/// PATCH /api/email/:id/important — flips the flag.
pub async fn toggle_important(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<EmailMessage>, (StatusCode, String)> {
    let id = parse_uuid_param(&id, "email id")?;

    let mut email = state
        .store
        .get_email(id)
        .await
        .map_err(map_otto_error)?
        .ok_or((StatusCode::NOT_FOUND, "Email message not found".into()))?;

    email.is_important = !email.is_important;

    state
        .store
        .update_email(&email)
        .await
        .map_err(map_otto_error)?;

    Ok(Json(email))
}

/// GET /api/email/summary
pub async fn email_summary(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SummaryQuery>,
) -> Result<Json<serde_json::Value>, (StatusCode, String)> {
    let report = state
        .email
        .summary(query.days_back)
        .await
        .map_err(map_otto_error)?;

    Ok(Json(serde_json::json!(report)))
}

/// GET /api/email/insights
pub async fn email_insights(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    Json(serde_json::json!(state.email.insights()))
}

/// POST /api/email/reply — canned reply suggestions for an email.
pub async fn suggest_reply(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SuggestReplyRequest>,
) -> Result<Json<serde_json::Value>, (StatusCode, String)> {
    let id = parse_uuid_param(&req.email_id, "email id")?;

    state
        .store
        .get_email(id)
        .await
        .map_err(map_otto_error)?
        .ok_or((StatusCode::NOT_FOUND, "Email message not found".into()))?;

    Ok(Json(serde_json::json!({
        "suggested_replies": state.email.suggested_replies(),
    })))
}

/// POST /api/email/send
pub async fn send_email(
    State(state): State<Arc<AppState>>,
    Json(draft): Json<EmailDraft>,
) -> Result<Json<serde_json::Value>, (StatusCode, String)> {
    if draft.to.trim().is_empty() {
        return Err((StatusCode::BAD_REQUEST, "recipient is required".into()));
    }

    let email = state.email.send(&draft).await.map_err(map_otto_error)?;

    Ok(Json(serde_json::json!({
        "message": "Email sent successfully",
        "id": email.id.to_string(),
    })))
}

/// GET /api/email/sync — no provider integration; reports a no-op sync.
pub async fn sync_gmail() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "message": "Gmail sync completed",
        "emails_synced": 0,
    }))
}
