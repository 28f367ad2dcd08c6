//! Axum route handlers for the Definition API.

use axum::{extract::State, Json};

use crate::composition::handlers::ComposeRequest;
use crate::errors::AppError;
use crate::generation::generator::{generate_definition, GeneratedDefinition};
use crate::state::AppState;

/// POST /api/v1/definitions/generate
///
/// Composes the prompt and sends it to the configured model backend.
/// Answers 501 when no backend is configured.
pub async fn handle_generate(
    State(state): State<AppState>,
    Json(body): Json<ComposeRequest>,
) -> Result<Json<GeneratedDefinition>, AppError> {
    let writer = state.writer.as_ref().ok_or_else(|| {
        AppError::NotImplemented(
            "definition generation requires ANTHROPIC_API_KEY to be set".to_string(),
        )
    })?;

    let config = state.prompt_defaults.with_overrides(&body.options)?;
    let generated =
        generate_definition(&state.orchestrator, writer.as_ref(), &body.request, &config).await?;

    Ok(Json(generated))
}
