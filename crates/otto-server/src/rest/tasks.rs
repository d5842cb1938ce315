use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::Deserialize;

use otto_core::{Task, TaskFilter, TaskPriority, TaskStatus, TaskStore, TaskUpdate};

use crate::rest::{map_otto_error, parse_uuid_param};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / Response types
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
pub struct CreateTaskRequest {
    pub title: String,
    pub description: Option<String>,
    #[serde(default)]
    pub priority: TaskPriority,
    pub due_at: Option<DateTime<Utc>>,
    pub reminder_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub category: Option<String>,
}

#[derive(Deserialize)]
pub struct ListTasksQuery {
    pub status: Option<TaskStatus>,
    pub priority: Option<TaskPriority>,
    pub category: Option<String>,
    #[serde(default = "default_limit")]
    pub limit: usize,
    #[serde(default)]
    pub offset: usize,
}

fn default_limit() -> usize {
    50
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/tasks
pub async fn create_task(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateTaskRequest>,
) -> Result<(StatusCode, Json<Task>), (StatusCode, String)> {
    let mut task = Task::new(req.title).with_priority(req.priority);
    if let Some(description) = req.description {
        task = task.with_description(description);
    }
    if let Some(due_at) = req.due_at {
        task = task.with_due_at(due_at);
    }
    task.reminder_at = req.reminder_at;
    if !req.tags.is_empty() {
        task = task.with_tags(req.tags);
    }
    if let Some(category) = req.category {
        task = task.with_category(category);
    }

    state
        .store
        .insert_task(&task)
        .await
        .map_err(map_otto_error)?;

    Ok((StatusCode::CREATED, Json(task)))
}

/// GET /api/tasks
pub async fn list_tasks(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListTasksQuery>,
) -> Result<Json<Vec<Task>>, (StatusCode, String)> {
    let filter = TaskFilter {
        status: query.status,
        priority: query.priority,
        category: query.category,
    };

    let tasks = state
        .store
        .list_tasks(&filter, query.limit, query.offset)
        .await
        .map_err(map_otto_error)?;

    Ok(Json(tasks))
}

/// GET /api/tasks/:id
pub async fn get_task(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Task>, (StatusCode, String)> {
    let id = parse_uuid_param(&id, "task id")?;

    let task = state
        .store
        .get_task(id)
        .await
        .map_err(map_otto_error)?
        .ok_or((StatusCode::NOT_FOUND, "Task not found".into()))?;

    Ok(Json(task))
}

/// PUT /api/tasks/:id — partial field merge.
pub async fn update_task(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(update): Json<TaskUpdate>,
) -> Result<Json<Task>, (StatusCode, String)> {
    let id = parse_uuid_param(&id, "task id")?;

    let mut task = state
        .store
        .get_task(id)
        .await
        .map_err(map_otto_error)?
        .ok_or((StatusCode::NOT_FOUND, "Task not found".into()))?;

    task.apply(update);

    state
        .store
        .update_task(&task)
        .await
        .map_err(map_otto_error)?;

    Ok(Json(task))
}

/// DELETE /api/tasks/:id
pub async fn delete_task(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, (StatusCode, String)> {
    let id = parse_uuid_param(&id, "task id")?;

    let deleted = state
        .store
        .delete_task(id)
        .await
        .map_err(map_otto_error)?;

    if !deleted {
        return Err((StatusCode::NOT_FOUND, "Task not found".into()));
    }

    Ok(Json(serde_json::json!({ "message": "Task deleted successfully" })))
}

/// GET /api/tasks/insights
pub async fn task_insights(
    State(state): State<Arc<AppState>>,
) -> Result<Json<serde_json::Value>, (StatusCode, String)> {
    let insights = state.tasks.insights().await.map_err(map_otto_error)?;
    Ok(Json(serde_json::to_value(insights).map_err(|e| {
        (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
    })?))
}

/// GET /api/tasks/:id/suggestions
pub async fn task_suggestions(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, (StatusCode, String)> {
    let id = parse_uuid_param(&id, "task id")?;

    let suggestions = state
        .tasks
        .improvement_suggestions(id)
        .await
        .map_err(map_otto_error)?;

    Ok(Json(serde_json::json!({
        "task_id": id.to_string(),
        "suggestions": suggestions,
    })))
}
