use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use otto_core::{Suggestion, SuggestionKind, SuggestionStore};
use otto_engine::seed::demo_suggestions;

use crate::rest::{map_otto_error, parse_uuid_param};
use crate::state::AppState;

#[derive(Deserialize)]
pub struct ListSuggestionsQuery {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub include_dismissed: bool,
    #[serde(default = "default_limit")]
    pub limit: usize,
}

fn default_limit() -> usize {
    10
}

#[derive(serde::Serialize)]
pub struct SuggestionList {
    pub suggestions: Vec<Suggestion>,
    pub total: usize,
}

/// GET /api/suggestions
pub async fn list_suggestions(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListSuggestionsQuery>,
) -> Result<Json<SuggestionList>, (StatusCode, String)> {
    let kind = match query.kind.as_deref() {
        Some(raw) => Some(
            raw.parse::<SuggestionKind>()
                .map_err(|e| (StatusCode::BAD_REQUEST, e))?,
        ),
        None => None,
    };

    let suggestions = state
        .store
        .list_suggestions(kind, query.include_dismissed, query.limit)
        .await
        .map_err(map_otto_error)?;
    let total = suggestions.len();

    Ok(Json(SuggestionList { suggestions, total }))
}

/// POST /api/suggestions/generate — inserts the canned suggestion set.
/// A real implementation would derive these from the user's data.
pub async fn generate_suggestions(
    State(state): State<Arc<AppState>>,
) -> Result<Json<serde_json::Value>, (StatusCode, String)> {
    let generated = demo_suggestions();
    let titles: Vec<String> = generated.iter().map(|s| s.title.clone()).collect();

    for suggestion in &generated {
        state
            .store
            .insert_suggestion(suggestion)
            .await
            .map_err(map_otto_error)?;
    }

    Ok(Json(serde_json::json!({
        "message": "New suggestions generated",
        "count": titles.len(),
        "suggestions_generated": titles,
    })))
}

/// POST /api/suggestions/:id/accept
pub async fn accept_suggestion(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, (StatusCode, String)> {
    let id = parse_uuid_param(&id, "suggestion id")?;

    let suggestion = state
        .store
        .get_suggestion(id)
        .await
        .map_err(map_otto_error)?
        .ok_or((StatusCode::NOT_FOUND, "Suggestion not found".into()))?;

    // Accepting also retires the suggestion from the active list.
    state
        .store
        .dismiss_suggestion(id)
        .await
        .map_err(map_otto_error)?;

    let action_taken = match suggestion.action_type {
        SuggestionKind::Task => "Task created",
        SuggestionKind::Event => "Event scheduled",
        SuggestionKind::Email => "Email drafted",
        SuggestionKind::General => "Reminder set",
    };

    Ok(Json(serde_json::json!({
        "message": format!("Suggestion {id} accepted and executed"),
        "action_taken": action_taken,
    })))
}

/// DELETE /api/suggestions/:id — sets the dismissal flag.
pub async fn dismiss_suggestion(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, (StatusCode, String)> {
    let id = parse_uuid_param(&id, "suggestion id")?;

    let dismissed = state
        .store
        .dismiss_suggestion(id)
        .await
        .map_err(map_otto_error)?;

    if !dismissed {
        return Err((StatusCode::NOT_FOUND, "Suggestion not found".into()));
    }

    Ok(Json(serde_json::json!({
        "message": format!("Suggestion {id} dismissed"),
    })))
}
