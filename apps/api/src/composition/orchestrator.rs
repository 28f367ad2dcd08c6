//! Prompt composition: schedule, execute, deduplicate, assemble.
//!
//! Flow per request: build EnrichedContext → fresh ModuleContext → for each
//! module in the resolved order: validate → execute → apply shared-state writes
//! → deduplication pass → join fragments with one blank line.

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::composition::dedup::{deduplicate, Fragment};
use crate::composition::enrichment::EnrichedContext;
use crate::composition::module::{
    Dependency, ModuleContext, ModuleId, ModuleOutput, PromptModule, Readiness,
};
use crate::composition::modules::default_modules;
use crate::composition::options::PromptConfig;
use crate::composition::scheduler::resolve_order;
use crate::composition::trace::{CompositionPhase, ExecutionTrace, ModuleOutcome, TraceEntry};
use crate::errors::{ComposeError, ConfigurationError, ContractViolation, ModuleError};
use crate::models::request::GenerationRequest;
use crate::rules::RuleSource;

/// Separator between fragments in the assembled prompt.
const FRAGMENT_SEPARATOR: &str = "\n\n";

// ────────────────────────────────────────────────────────────────────────────
// Data models
// ────────────────────────────────────────────────────────────────────────────

/// The result of one composition.
#[derive(Debug, Clone, Serialize)]
pub struct Composition {
    pub prompt: String,
    pub trace: ExecutionTrace,
    pub richness_score: f64,
}

/// Static description of a registered module, in execution order.
#[derive(Debug, Clone, Serialize)]
pub struct ModuleDescriptor {
    pub position: usize,
    pub module_id: String,
    pub priority: i32,
    pub hard_dependencies: Vec<String>,
    pub soft_dependencies: Vec<String>,
}

/// Owns the module catalogue and its resolved order. Built once at startup and
/// shared across requests; holds no request-scoped state.
pub struct Orchestrator {
    modules: Vec<Box<dyn PromptModule>>,
    order: Vec<usize>,
    rules: Arc<RuleSource>,
}

impl Orchestrator {
    /// Resolves the execution order. Cycles, duplicates and missing hard
    /// dependencies are rejected here, never at request time.
    pub fn new(
        modules: Vec<Box<dyn PromptModule>>,
        rules: Arc<RuleSource>,
    ) -> Result<Self, ConfigurationError> {
        let order = resolve_order(&modules)?;
        let orchestrator = Self {
            modules,
            order,
            rules,
        };
        info!(
            "Orchestrator ready: {} modules, order [{}]",
            orchestrator.modules.len(),
            orchestrator
                .execution_order()
                .iter()
                .map(ModuleId::name)
                .collect::<Vec<_>>()
                .join(", ")
        );
        Ok(orchestrator)
    }

    pub fn with_default_modules(rules: Arc<RuleSource>) -> Result<Self, ConfigurationError> {
        Self::new(default_modules(), rules)
    }

    pub fn execution_order(&self) -> Vec<ModuleId> {
        self.order.iter().map(|&i| self.modules[i].id()).collect()
    }

    pub fn describe(&self) -> Vec<ModuleDescriptor> {
        self.order
            .iter()
            .enumerate()
            .map(|(position, &i)| {
                let module = &self.modules[i];
                let (hard, soft): (Vec<&Dependency>, Vec<&Dependency>) = module
                    .dependencies()
                    .iter()
                    .partition(|d| matches!(d, Dependency::Hard(_)));
                ModuleDescriptor {
                    position,
                    module_id: module.id().name(),
                    priority: module.priority(),
                    hard_dependencies: hard.iter().map(|d| d.target().name()).collect(),
                    soft_dependencies: soft.iter().map(|d| d.target().name()).collect(),
                }
            })
            .collect()
    }

    pub fn rules(&self) -> &RuleSource {
        &self.rules
    }

    /// Composes the prompt for one request.
    ///
    /// Module failures are recorded and composition continues; a contract
    /// violation aborts.
    pub fn compose(
        &self,
        request: &GenerationRequest,
        config: &PromptConfig,
    ) -> Result<Composition, ComposeError> {
        let mut trace = ExecutionTrace::default();

        let enriched = EnrichedContext::build(request)?;
        let mut ctx = ModuleContext::new(&enriched, config, &self.rules);

        trace.phase = CompositionPhase::Scheduling;
        debug!("Composing prompt for '{}' over {} modules", ctx.term, self.order.len());

        trace.phase = CompositionPhase::Executing;
        let mut fragments = Vec::new();
        for &index in &self.order {
            let module = self.modules[index].as_ref();
            let entry = self.run_module(module, &mut ctx, &mut fragments)?;
            trace.entries.push(entry);
        }

        let skipped = trace
            .entries
            .iter()
            .filter(|e| e.skip_reason().is_some())
            .count();
        debug!("Processed {} module(s), {skipped} skipped", trace.entries.len());

        trace.phase = CompositionPhase::Deduplicating;
        let context_values = ctx.shared.context_values().unwrap_or_default().to_vec();
        let outcome = deduplicate(fragments, ModuleId::ContextRender, &context_values, &ctx.term);
        if !outcome.actions.is_empty() {
            debug!("Deduplication removed {} line(s)", outcome.actions.len());
        }
        trace.dedup_actions = outcome.actions;

        let prompt = outcome
            .fragments
            .iter()
            .map(|f| f.text.as_str())
            .collect::<Vec<_>>()
            .join(FRAGMENT_SEPARATOR);
        trace.phase = CompositionPhase::Assembled;

        let richness_score = ctx.shared.richness_score().unwrap_or(0.0);
        if trace.degraded() {
            warn!(
                "Prompt for '{}' is degraded; failed modules: {}",
                ctx.term,
                trace.failed_modules().join(", ")
            );
        }
        info!(
            "Composed prompt for '{}': {} chars, richness {:.2}",
            ctx.term,
            prompt.chars().count(),
            richness_score
        );

        Ok(Composition {
            prompt,
            trace,
            richness_score,
        })
    }

    /// Validates and executes one module, applying its writes on success.
    fn run_module(
        &self,
        module: &dyn PromptModule,
        ctx: &mut ModuleContext<'_>,
        fragments: &mut Vec<Fragment>,
    ) -> Result<TraceEntry, ContractViolation> {
        let id = module.id();
        let mut entry = TraceEntry {
            module_id: id.name(),
            priority: module.priority(),
            ran: false,
            outcome: ModuleOutcome::Executed,
            fragment_length: 0,
            shared_state_writes: Vec::new(),
            metadata: Default::default(),
        };

        match guarded(|| Ok(module.validate_input(ctx))) {
            Ok(Readiness::Ready) => {}
            Ok(Readiness::Skip(reason)) => {
                debug!("Module {id} skipped: {reason}");
                entry.outcome = ModuleOutcome::Skipped { reason };
                return Ok(entry);
            }
            Err(ModuleError::Contract(violation)) => return Err(violation),
            Err(ModuleError::Execution(error)) => {
                warn!("Module {id} failed validation: {error}");
                entry.outcome = ModuleOutcome::Failed { error };
                return Ok(entry);
            }
        }

        let output = match guarded(|| module.execute(ctx)) {
            Ok(output) => output,
            Err(ModuleError::Contract(violation)) => return Err(violation),
            Err(ModuleError::Execution(error)) => {
                warn!("Module {id} failed: {error}");
                entry.outcome = ModuleOutcome::Failed { error };
                return Ok(entry);
            }
        };

        let ModuleOutput {
            fragment,
            writes,
            metadata,
        } = output;
        for value in writes {
            entry.shared_state_writes.push(ctx.shared.publish(id, value)?);
        }
        ctx.executed.insert(id);

        entry.ran = true;
        entry.fragment_length = fragment.chars().count();
        entry.metadata = metadata;
        if !fragment.trim().is_empty() {
            fragments.push(Fragment {
                module: id,
                text: fragment,
            });
        }
        Ok(entry)
    }
}

/// Runs one module callback, turning a panic into an execution error.
fn guarded<T>(call: impl FnOnce() -> Result<T, ModuleError>) -> Result<T, ModuleError> {
    panic::catch_unwind(AssertUnwindSafe(call)).unwrap_or_else(|payload| {
        let message = payload
            .downcast_ref::<&str>()
            .map(|s| s.to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "module panicked".to_string());
        Err(ModuleError::Execution(format!("panic: {message}")))
    })
}
