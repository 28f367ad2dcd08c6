//! Definition Generation: composes the prompt and sends it to a writer backend.
//!
//! Flow: compose → writer.write → clean → bounds check → return.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::composition::options::PromptConfig;
use crate::composition::orchestrator::Orchestrator;
use crate::composition::trace::ExecutionTrace;
use crate::errors::AppError;
use crate::generation::prompts::{DEFINITION_LABELS, DEFINITION_SYSTEM};
use crate::llm_client::{LlmClient, LlmError};
use crate::models::request::GenerationRequest;

// ────────────────────────────────────────────────────────────────────────────
// Trait definition
// ────────────────────────────────────────────────────────────────────────────

/// Turns a composed prompt into definition text. Implement this to swap the
/// model backend without touching the handler.
///
/// Carried in `AppState` as `Option<Arc<dyn DefinitionWriter>>`.
#[async_trait]
pub trait DefinitionWriter: Send + Sync {
    /// Short backend name, reported in responses.
    fn backend(&self) -> &str;

    async fn write(&self, prompt: &str) -> Result<String, LlmError>;
}

#[async_trait]
impl DefinitionWriter for LlmClient {
    fn backend(&self) -> &str {
        self.model()
    }

    async fn write(&self, prompt: &str) -> Result<String, LlmError> {
        self.draft_definition(prompt, DEFINITION_SYSTEM).await
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Data models
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct GeneratedDefinition {
    pub request_id: Uuid,
    pub term: String,
    pub definition: String,
    /// Character count of the cleaned definition.
    pub length: usize,
    pub within_bounds: bool,
    pub richness_score: f64,
    pub degraded: bool,
    pub backend: String,
    pub trace: ExecutionTrace,
    pub generated_at: DateTime<Utc>,
}

// ────────────────────────────────────────────────────────────────────────────
// Generation pipeline
// ────────────────────────────────────────────────────────────────────────────

/// Composes the prompt for `request` and asks `writer` for the definition.
///
/// A degraded composition is still sent; the flag is carried into the response.
pub async fn generate_definition(
    orchestrator: &Orchestrator,
    writer: &dyn DefinitionWriter,
    request: &GenerationRequest,
    config: &PromptConfig,
) -> Result<GeneratedDefinition, AppError> {
    let composition = orchestrator.compose(request, config)?;
    let degraded = composition.trace.degraded();
    if degraded {
        warn!(
            "Sending degraded prompt for '{}' to {}",
            request.term.trim(),
            writer.backend()
        );
    }

    let raw = writer.write(&composition.prompt).await?;
    let term = request.term.trim().to_string();
    let definition = clean_definition(&raw, &term);
    if definition.is_empty() {
        return Err(AppError::Llm("model returned no usable definition".to_string()));
    }

    let bounds = request.bounds();
    let length = definition.chars().count();
    let within_bounds = (bounds.min_chars..=bounds.max_chars).contains(&length);
    if !within_bounds {
        warn!(
            "Definition for '{term}' is {length} chars, outside {}..={}",
            bounds.min_chars, bounds.max_chars
        );
    }

    let request_id = Uuid::new_v4();
    info!(
        "Generated definition {request_id} for '{term}' via {} ({length} chars)",
        writer.backend()
    );

    Ok(GeneratedDefinition {
        request_id,
        term,
        definition,
        length,
        within_bounds,
        richness_score: composition.richness_score,
        degraded,
        backend: writer.backend().to_string(),
        trace: composition.trace,
        generated_at: Utc::now(),
    })
}

/// Strips code fences, a leading label or `term:` prefix, and wrapping quotes,
/// then collapses whitespace.
pub fn clean_definition(raw: &str, term: &str) -> String {
    let mut text = strip_fences(raw.trim());

    let term_label = format!("{}:", term.to_lowercase());
    for label in DEFINITION_LABELS.iter().copied().chain([term_label.as_str()]) {
        let head = text.get(..label.len());
        if head.is_some_and(|head| head.to_lowercase() == label) {
            text = text[label.len()..].trim_start();
            break;
        }
    }

    let text = text
        .trim_matches(|c| matches!(c, '"' | '\'' | '“' | '”' | '‘' | '’'))
        .trim();
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn strip_fences(text: &str) -> &str {
    match text.strip_prefix("```") {
        Some(rest) => {
            // Drop an optional language tag on the opening fence line.
            let body = rest.split_once('\n').map_or(rest, |(_, body)| body);
            body.trim_end().strip_suffix("```").unwrap_or(body).trim()
        }
        None => text,
    }
}
