use std::sync::Arc;
use std::time::Instant;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use crate::state::AppState;

#[derive(Deserialize)]
pub struct WebSearchQuery {
    pub q: String,
    #[serde(default = "default_limit")]
    pub limit: usize,
}

fn default_limit() -> usize {
    10
}

#[derive(Deserialize)]
pub struct SuggestionsQuery {
    pub q: String,
}

/// GET /api/search/web
pub async fn search_web(
    State(state): State<Arc<AppState>>,
    Query(query): Query<WebSearchQuery>,
) -> Result<Json<serde_json::Value>, (StatusCode, String)> {
    if query.q.trim().is_empty() {
        return Err((StatusCode::BAD_REQUEST, "query must not be empty".into()));
    }
    let limit = query.limit.clamp(1, 20);

    let started = Instant::now();
    let results = state.search.search_web(&query.q, limit).await;
    let search_time = started.elapsed().as_secs_f64();

    Ok(Json(serde_json::json!({
        "query": query.q,
        "total_results": results.len(),
        "results": results,
        "search_time": search_time,
    })))
}

/// GET /api/search/suggestions
pub async fn search_suggestions(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SuggestionsQuery>,
) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "query": query.q,
        "suggestions": state.search.suggestions(&query.q),
    }))
}
