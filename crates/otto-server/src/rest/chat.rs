use std::sync::Arc;
use std::time::Instant;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use otto_core::{ChatMessage, MessageRole, MessageStore};

use crate::rest::map_otto_error;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / Response types
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
pub struct SendMessageRequest {
    pub content: String,
    pub session_id: Option<String>,
}

#[derive(Serialize)]
pub struct ChatResponse {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub content: String,
    pub timestamp: DateTime<Utc>,
    pub session_id: String,
    pub suggestions: serde_json::Value,
}

#[derive(Deserialize)]
pub struct HistoryQuery {
    pub session_id: Option<String>,
    #[serde(default = "default_limit")]
    pub limit: usize,
    #[serde(default)]
    pub offset: usize,
}

fn default_limit() -> usize {
    50
}

#[derive(Serialize)]
pub struct ChatHistory {
    pub messages: Vec<ChatResponse>,
    pub total: usize,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/chat/send
///
/// Persists the user message, runs the assistant pipeline, persists the
/// assistant reply, and schedules any extracted actions as deferred
/// fire-and-forget work.
pub async fn send_message(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SendMessageRequest>,
) -> Result<Json<ChatResponse>, (StatusCode, String)> {
    let session_id = req
        .session_id
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    let user_msg =
        ChatMessage::new(MessageRole::User, req.content.clone()).with_session(&session_id);
    state
        .store
        .insert_message(&user_msg)
        .await
        .map_err(map_otto_error)?;

    let started = Instant::now();
    let reply = state.assistant.respond(&req.content, &session_id).await;
    let processing_ms = started.elapsed().as_millis() as u64;

    let metadata = serde_json::json!({
        "suggestions": &reply.suggestions,
        "actions": &reply.actions,
    });

    let mut assistant_msg = ChatMessage::new(MessageRole::Assistant, reply.content.clone())
        .with_session(&session_id)
        .with_metadata(metadata.clone())
        .with_processing_ms(processing_ms);
    if let Some(ref model) = reply.model_used {
        assistant_msg = assistant_msg.with_model(model.clone());
    }

    state
        .store
        .insert_message(&assistant_msg)
        .await
        .map_err(map_otto_error)?;

    // Deferred action processing: failures are logged inside the executor
    // and never surfaced to this request.
    if !reply.actions.is_empty() {
        let executor = Arc::clone(&state.executor);
        let actions = reply.actions.clone();
        tokio::spawn(async move {
            executor.process(actions).await;
        });
    }

    Ok(Json(ChatResponse {
        id: assistant_msg.id.to_string(),
        kind: "assistant".into(),
        content: reply.content,
        timestamp: assistant_msg.created_at,
        session_id,
        suggestions: metadata["suggestions"].clone(),
    }))
}

/// GET /api/chat/history — oldest first, optionally scoped to a session.
pub async fn chat_history(
    State(state): State<Arc<AppState>>,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<ChatHistory>, (StatusCode, String)> {
    let session = query.session_id.as_deref();

    let mut messages = state
        .store
        .list_messages(session, query.limit, query.offset)
        .await
        .map_err(map_otto_error)?;
    let total = state
        .store
        .count_messages(session)
        .await
        .map_err(map_otto_error)?;

    // Fetched newest-first; present oldest-first.
    messages.reverse();

    let messages = messages
        .into_iter()
        .map(|msg| {
            let suggestions = msg
                .metadata
                .as_ref()
                .and_then(|m| m.get("suggestions").cloned())
                .unwrap_or_else(|| serde_json::json!([]));
            ChatResponse {
                id: msg.id.to_string(),
                kind: msg.role.to_string(),
                content: msg.content,
                timestamp: msg.created_at,
                session_id: msg.session_id.unwrap_or_default(),
                suggestions,
            }
        })
        .collect();

    Ok(Json(ChatHistory { messages, total }))
}

/// DELETE /api/chat/history/:session_id
pub async fn clear_history(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
) -> Result<Json<serde_json::Value>, (StatusCode, String)> {
    let removed = state
        .store
        .clear_session(&session_id)
        .await
        .map_err(map_otto_error)?;

    Ok(Json(serde_json::json!({
        "message": format!("Cleared {removed} messages from session {session_id}"),
    })))
}
