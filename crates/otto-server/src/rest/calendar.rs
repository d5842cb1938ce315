use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::Deserialize;

use otto_core::{CalendarEvent, EventFilter, EventStore, EventUpdate};

use crate::rest::{map_otto_error, parse_uuid_param};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / Response types
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
pub struct CreateEventRequest {
    pub title: String,
    pub description: Option<String>,
    pub start_at: DateTime<Utc>,
    pub end_at: DateTime<Utc>,
    pub location: Option<String>,
    #[serde(default)]
    pub attendees: Vec<String>,
}

#[derive(Deserialize)]
pub struct ListEventsQuery {
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    #[serde(default = "default_limit")]
    pub limit: usize,
    #[serde(default)]
    pub offset: usize,
}

fn default_limit() -> usize {
    50
}

#[derive(Deserialize)]
pub struct UpcomingQuery {
    #[serde(default = "default_days_ahead")]
    pub days: i64,
    #[serde(default = "default_upcoming_limit")]
    pub limit: usize,
}

fn default_days_ahead() -> i64 {
    7
}

fn default_upcoming_limit() -> usize {
    5
}

#[derive(Deserialize)]
pub struct FreeSlotsQuery {
    #[serde(default = "default_duration")]
    pub duration_minutes: u32,
    #[serde(default = "default_days_ahead")]
    pub days_ahead: i64,
}

fn default_duration() -> u32 {
    60
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/calendar/events
pub async fn create_event(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateEventRequest>,
) -> Result<(StatusCode, Json<CalendarEvent>), (StatusCode, String)> {
    let mut event = CalendarEvent::new(req.title, req.start_at, req.end_at)
        .with_attendees(req.attendees);
    if let Some(description) = req.description {
        event = event.with_description(description);
    }
    if let Some(location) = req.location {
        event = event.with_location(location);
    }

    state
        .store
        .insert_event(&event)
        .await
        .map_err(map_otto_error)?;

    Ok((StatusCode::CREATED, Json(event)))
}

/// GET /api/calendar/events
pub async fn list_events(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListEventsQuery>,
) -> Result<Json<Vec<CalendarEvent>>, (StatusCode, String)> {
    let filter = EventFilter {
        start_after: query.start_date,
        end_before: query.end_date,
    };

    let events = state
        .store
        .list_events(&filter, query.limit, query.offset)
        .await
        .map_err(map_otto_error)?;

    Ok(Json(events))
}

/// GET /api/calendar/events/:id
pub async fn get_event(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<CalendarEvent>, (StatusCode, String)> {
    let id = parse_uuid_param(&id, "event id")?;

    let event = state
        .store
        .get_event(id)
        .await
        .map_err(map_otto_error)?
        .ok_or((StatusCode::NOT_FOUND, "Calendar event not found".into()))?;

    Ok(Json(event))
}

/// PUT /api/calendar/events/:id — partial field merge.
pub async fn update_event(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(update): Json<EventUpdate>,
) -> Result<Json<CalendarEvent>, (StatusCode, String)> {
    let id = parse_uuid_param(&id, "event id")?;

    let mut event = state
        .store
        .get_event(id)
        .await
        .map_err(map_otto_error)?
        .ok_or((StatusCode::NOT_FOUND, "Calendar event not found".into()))?;

    event.apply(update);

    state
        .store
        .update_event(&event)
        .await
        .map_err(map_otto_error)?;

    Ok(Json(event))
}

/// DELETE /api/calendar/events/:id
pub async fn delete_event(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, (StatusCode, String)> {
    let id = parse_uuid_param(&id, "event id")?;

    let deleted = state
        .store
        .delete_event(id)
        .await
        .map_err(map_otto_error)?;

    if !deleted {
        return Err((StatusCode::NOT_FOUND, "Calendar event not found".into()));
    }

    Ok(Json(serde_json::json!({ "message": "Calendar event deleted successfully" })))
}

/// GET /api/calendar/upcoming
pub async fn upcoming_events(
    State(state): State<Arc<AppState>>,
    Query(query): Query<UpcomingQuery>,
) -> Result<Json<serde_json::Value>, (StatusCode, String)> {
    let events = state
        .calendar
        .upcoming(query.days, query.limit)
        .await
        .map_err(map_otto_error)?;

    let mut body = serde_json::json!({ "events": events });
    if events_is_empty(&body) {
        body["message"] =
            serde_json::json!("Connect your Google Calendar to see upcoming events");
    }
    Ok(Json(body))
}

fn events_is_empty(body: &serde_json::Value) -> bool {
    body["events"].as_array().map(|a| a.is_empty()).unwrap_or(true)
}

/// GET /api/calendar/free-slots
pub async fn free_slots(
    State(state): State<Arc<AppState>>,
    Query(query): Query<FreeSlotsQuery>,
) -> Json<serde_json::Value> {
    let slots = state
        .calendar
        .free_slots(query.duration_minutes, query.days_ahead);
    Json(serde_json::json!({ "slots": slots }))
}

/// GET /api/calendar/suggest-times
pub async fn suggest_times(
    State(state): State<Arc<AppState>>,
    Query(query): Query<FreeSlotsQuery>,
) -> Json<serde_json::Value> {
    let suggestions = state.calendar.suggest_meeting_times(query.duration_minutes);
    Json(serde_json::json!({ "suggestions": suggestions }))
}

/// GET /api/calendar/insights
pub async fn calendar_insights(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    Json(serde_json::json!(state.calendar.insights()))
}

/// GET /api/calendar/sync — no provider integration; reports a no-op sync.
pub async fn sync_calendar() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "message": "Calendar sync completed",
        "events_synced": 0,
    }))
}
