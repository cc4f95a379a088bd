use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::state::AppState;

/// GET /health
/// Returns service status plus the in-memory session and record counts.
pub async fn health_handler(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "service": "latexgpt",
        "model": state.config.gemini_model,
        "apiKeyConfigured": state.config.gemini_api_key.is_some(),
        "sessions": state.sessions.len().await,
        "records": state.records.len().await,
    }))
}
