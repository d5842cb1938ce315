//! Authentication stubs. The backend serves a single local desktop shell;
//! every endpoint resolves to the demo user and a fixed bearer token.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use otto_core::{GoogleToken, UserStore};

use crate::rest::map_otto_error;
use crate::state::{AppState, DEMO_USER_NAME};

const DEMO_TOKEN: &str = "demo_token";

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    #[allow(dead_code)]
    pub password: Option<String>,
}

#[derive(Deserialize)]
pub struct GoogleCallbackRequest {
    pub code: String,
}

/// POST /api/auth/login
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<serde_json::Value>, (StatusCode, String)> {
    let user = state
        .store
        .ensure_user(&req.email, DEMO_USER_NAME)
        .await
        .map_err(map_otto_error)?;

    Ok(Json(serde_json::json!({
        "access_token": DEMO_TOKEN,
        "token_type": "bearer",
        "user": {
            "id": user.id.to_string(),
            "email": user.email,
            "name": user.full_name,
        },
    })))
}

/// GET /api/auth/google/login
pub async fn google_login() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "auth_url": "https://accounts.google.com/oauth/authorize?...",
    }))
}

/// POST /api/auth/google/callback — records a placeholder token for the
/// demo user.
pub async fn google_callback(
    State(state): State<Arc<AppState>>,
    Json(req): Json<GoogleCallbackRequest>,
) -> Result<Json<serde_json::Value>, (StatusCode, String)> {
    let user = state.demo_user().await.map_err(map_otto_error)?;

    let mut token = GoogleToken::new(user.id, format!("demo_google_{}", req.code));
    token.calendar_enabled = true;
    token.gmail_enabled = true;

    state
        .store
        .upsert_google_token(&token)
        .await
        .map_err(map_otto_error)?;

    Ok(Json(serde_json::json!({
        "message": "Google authentication successful",
    })))
}

/// GET /api/auth/me
pub async fn current_user(
    State(state): State<Arc<AppState>>,
) -> Result<Json<serde_json::Value>, (StatusCode, String)> {
    let user = state.demo_user().await.map_err(map_otto_error)?;
    let google_connected = state
        .store
        .get_google_token(user.id)
        .await
        .map_err(map_otto_error)?
        .is_some();

    Ok(Json(serde_json::json!({
        "id": user.id.to_string(),
        "email": user.email,
        "name": user.full_name,
        "google_connected": google_connected,
    })))
}
