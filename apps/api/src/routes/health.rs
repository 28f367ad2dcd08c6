use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::state::AppState;

/// GET /health
/// Returns service version plus what the instance was started with.
pub async fn health_handler(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "service": "definition-api",
        "rules_loaded": state.orchestrator.rules().len(),
        "generation_enabled": state.writer.is_some(),
        "model": state.config.llm_model,
    }))
}
