//! Axum route handlers for the Prompt API.

use axum::{extract::State, Json};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::info;
use uuid::Uuid;

use crate::composition::orchestrator::ModuleDescriptor;
use crate::composition::trace::ExecutionTrace;
use crate::errors::AppError;
use crate::models::request::GenerationRequest;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

/// A generation request plus per-request option overrides.
#[derive(Debug, Deserialize)]
pub struct ComposeRequest {
    #[serde(flatten)]
    pub request: GenerationRequest,
    #[serde(default)]
    pub options: Map<String, Value>,
}

#[derive(Debug, Serialize)]
pub struct ComposeResponse {
    pub request_id: Uuid,
    pub prompt: String,
    pub trace: ExecutionTrace,
    pub richness_score: f64,
    pub degraded: bool,
    pub composed_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct ModuleListResponse {
    pub modules: Vec<ModuleDescriptor>,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/prompts/compose
///
/// Composes the prompt without calling the model. The trace is for inspection only.
pub async fn handle_compose(
    State(state): State<AppState>,
    Json(body): Json<ComposeRequest>,
) -> Result<Json<ComposeResponse>, AppError> {
    let config = state.prompt_defaults.with_overrides(&body.options)?;
    let composition = state.orchestrator.compose(&body.request, &config)?;

    let request_id = Uuid::new_v4();
    info!(
        "Composed prompt {request_id} for '{}' ({} modules traced)",
        body.request.term.trim(),
        composition.trace.entries.len()
    );

    Ok(Json(ComposeResponse {
        request_id,
        degraded: composition.trace.degraded(),
        prompt: composition.prompt,
        trace: composition.trace,
        richness_score: composition.richness_score,
        composed_at: Utc::now(),
    }))
}

/// GET /api/v1/prompts/modules
///
/// The registered modules in execution order.
pub async fn handle_list_modules(State(state): State<AppState>) -> Json<ModuleListResponse> {
    Json(ModuleListResponse {
        modules: state.orchestrator.describe(),
    })
}
