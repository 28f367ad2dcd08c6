use std::sync::Arc;

use crate::composition::{Orchestrator, PromptConfig};
use crate::config::Config;
use crate::generation::generator::DefinitionWriter;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Module catalogue with its resolved order; owns the rule source.
    pub orchestrator: Arc<Orchestrator>,
    /// Startup option defaults; per-request `options` are applied on top.
    pub prompt_defaults: PromptConfig,
    /// Model backend. `None` when no API key is configured.
    pub writer: Option<Arc<dyn DefinitionWriter>>,
}
