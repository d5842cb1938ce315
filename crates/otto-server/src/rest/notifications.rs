use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use otto_core::{NotificationStatus, NotificationStore, PushSubscription};

use crate::rest::{map_otto_error, parse_uuid_param};
use crate::state::AppState;

#[derive(Deserialize)]
pub struct ListNotificationsQuery {
    pub status: Option<String>,
    #[serde(default = "default_limit")]
    pub limit: usize,
}

fn default_limit() -> usize {
    50
}

#[derive(Deserialize)]
pub struct SubscribeRequest {
    pub endpoint: String,
    /// Key material as supplied by the push service client.
    pub keys: serde_json::Value,
}

/// GET /api/notifications
pub async fn list_notifications(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListNotificationsQuery>,
) -> Result<Json<serde_json::Value>, (StatusCode, String)> {
    let status = match query.status.as_deref() {
        Some(raw) => Some(
            raw.parse::<NotificationStatus>()
                .map_err(|e| (StatusCode::BAD_REQUEST, e))?,
        ),
        None => None,
    };

    let notifications = state
        .store
        .list_notifications(status, query.limit)
        .await
        .map_err(map_otto_error)?;

    Ok(Json(serde_json::json!({ "notifications": notifications })))
}

/// POST /api/notifications/:id/read
pub async fn mark_notification_read(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, (StatusCode, String)> {
    let id = parse_uuid_param(&id, "notification id")?;

    let marked = state
        .store
        .mark_notification_read(id)
        .await
        .map_err(map_otto_error)?;

    if !marked {
        return Err((StatusCode::NOT_FOUND, "Notification not found".into()));
    }

    Ok(Json(serde_json::json!({ "message": "Notification marked as read" })))
}

/// POST /api/notifications/subscribe
pub async fn subscribe(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SubscribeRequest>,
) -> Result<(StatusCode, Json<PushSubscription>), (StatusCode, String)> {
    let subscription = PushSubscription::new(req.endpoint, req.keys.to_string());

    state
        .store
        .insert_subscription(&subscription)
        .await
        .map_err(map_otto_error)?;

    Ok((StatusCode::CREATED, Json(subscription)))
}

/// DELETE /api/notifications/subscriptions/:id
pub async fn unsubscribe(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, (StatusCode, String)> {
    let id = parse_uuid_param(&id, "subscription id")?;

    let deleted = state
        .store
        .delete_subscription(id)
        .await
        .map_err(map_otto_error)?;

    if !deleted {
        return Err((StatusCode::NOT_FOUND, "Subscription not found".into()));
    }

    Ok(Json(serde_json::json!({ "message": "Subscription removed" })))
}

/// GET /api/notifications/subscriptions
pub async fn list_subscriptions(
    State(state): State<Arc<AppState>>,
) -> Result<Json<serde_json::Value>, (StatusCode, String)> {
    let subscriptions = state
        .store
        .list_subscriptions()
        .await
        .map_err(map_otto_error)?;

    Ok(Json(serde_json::json!({ "subscriptions": subscriptions })))
}
