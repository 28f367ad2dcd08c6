//! The module abstraction: identity, static scheduling metadata, and the
//! per-request context every module reads from.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use crate::composition::enrichment::EnrichedContext;
use crate::composition::options::PromptConfig;
use crate::composition::shared_state::{SharedState, StateValue};
use crate::errors::ModuleError;
use crate::models::rule::RuleCategory;
use crate::rules::RuleSource;

/// Closed catalogue of module identities.
///
/// Priority and dependencies are part of each variant's declaration so the whole
/// schedule can be read from this one table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ModuleId {
    Role,
    OutputSpec,
    Grammar,
    ContextRender,
    RuleCategory(RuleCategory),
    SemanticCategory,
    Template,
    Constraint,
    FinalTask,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dependency {
    /// Must be registered; always runs first.
    Hard(ModuleId),
    /// Orders after the module when it is registered; ignored otherwise.
    Soft(ModuleId),
}

impl Dependency {
    pub fn target(&self) -> ModuleId {
        match self {
            Dependency::Hard(id) | Dependency::Soft(id) => *id,
        }
    }
}

impl ModuleId {
    /// Higher runs earlier, subject to dependencies.
    pub fn priority(&self) -> i32 {
        match self {
            ModuleId::Role => 100,
            ModuleId::OutputSpec => 90,
            ModuleId::Grammar => 85,
            ModuleId::ContextRender => 80,
            ModuleId::RuleCategory(_) => 75,
            ModuleId::SemanticCategory => 70,
            ModuleId::Template => 60,
            ModuleId::Constraint => 50,
            ModuleId::FinalTask => 0,
        }
    }

    pub fn dependencies(&self) -> &'static [Dependency] {
        match self {
            ModuleId::Role
            | ModuleId::OutputSpec
            | ModuleId::ContextRender
            | ModuleId::RuleCategory(_)
            | ModuleId::SemanticCategory => &[],
            ModuleId::Grammar => &[Dependency::Soft(ModuleId::Role)],
            ModuleId::Template => &[
                Dependency::Soft(ModuleId::Role),
                Dependency::Soft(ModuleId::SemanticCategory),
            ],
            ModuleId::Constraint => &[Dependency::Hard(ModuleId::ContextRender)],
            ModuleId::FinalTask => &[
                Dependency::Hard(ModuleId::SemanticCategory),
                Dependency::Hard(ModuleId::ContextRender),
            ],
        }
    }

    pub fn name(&self) -> String {
        match self {
            ModuleId::Role => "role".to_string(),
            ModuleId::OutputSpec => "output_spec".to_string(),
            ModuleId::Grammar => "grammar".to_string(),
            ModuleId::ContextRender => "context_render".to_string(),
            ModuleId::RuleCategory(category) => {
                format!("rules_{}", category.prefix().to_ascii_lowercase())
            }
            ModuleId::SemanticCategory => "semantic_category".to_string(),
            ModuleId::Template => "template".to_string(),
            ModuleId::Constraint => "constraint".to_string(),
            ModuleId::FinalTask => "final_task".to_string(),
        }
    }
}

impl fmt::Display for ModuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

/// Outcome of `validate_input`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Readiness {
    Ready,
    Skip(String),
}

/// What a module contributes: its fragment and the shared-state values it publishes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModuleOutput {
    pub fragment: String,
    pub writes: Vec<StateValue>,
    pub metadata: BTreeMap<String, String>,
}

impl ModuleOutput {
    pub fn fragment(text: impl Into<String>) -> Self {
        Self {
            fragment: text.into(),
            ..Default::default()
        }
    }

    /// An opt-out: empty fragment, no writes.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn publish(mut self, value: StateValue) -> Self {
        self.writes.push(value);
        self
    }

    pub fn with_metadata(mut self, key: &str, value: impl ToString) -> Self {
        self.metadata.insert(key.to_string(), value.to_string());
        self
    }
}

/// Per-request view handed to every module.
///
/// Borrowed inputs are shared and read-only; `shared` is owned by this request
/// and only mutated by the orchestrator between module executions.
pub struct ModuleContext<'a> {
    pub term: String,
    pub enriched: &'a EnrichedContext,
    pub config: &'a PromptConfig,
    pub rules: &'a RuleSource,
    pub shared: SharedState,
    /// Modules whose `execute` has completed successfully so far.
    pub executed: BTreeSet<ModuleId>,
}

impl<'a> ModuleContext<'a> {
    pub fn new(enriched: &'a EnrichedContext, config: &'a PromptConfig, rules: &'a RuleSource) -> Self {
        Self {
            term: enriched.term.clone(),
            enriched,
            config,
            rules,
            shared: SharedState::new(),
            executed: BTreeSet::new(),
        }
    }
}

/// A prompt-fragment producer.
///
/// Implementations are stateless apart from static configuration and are
/// reused across requests; nothing request-scoped may be stored on `self`.
pub trait PromptModule: Send + Sync {
    fn id(&self) -> ModuleId;

    fn priority(&self) -> i32 {
        self.id().priority()
    }

    fn dependencies(&self) -> &'static [Dependency] {
        self.id().dependencies()
    }

    fn validate_input(&self, _ctx: &ModuleContext<'_>) -> Readiness {
        Readiness::Ready
    }

    fn execute(&self, ctx: &ModuleContext<'_>) -> Result<ModuleOutput, ModuleError>;
}
