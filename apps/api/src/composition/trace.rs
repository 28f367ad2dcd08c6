use std::collections::BTreeMap;

use serde::Serialize;

use crate::composition::dedup::DedupAction;
use crate::composition::shared_state::StateKey;

/// Orchestrator progression for one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CompositionPhase {
    NotStarted,
    Scheduling,
    Executing,
    Deduplicating,
    Assembled,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ModuleOutcome {
    Executed,
    Skipped {
        #[serde(rename = "skip_reason")]
        reason: String,
    },
    Failed { error: String },
}

#[derive(Debug, Clone, Serialize)]
pub struct TraceEntry {
    pub module_id: String,
    pub priority: i32,
    pub ran: bool,
    #[serde(flatten)]
    pub outcome: ModuleOutcome,
    /// Fragment length in characters as the module returned it. The
    /// deduplication pass may shorten it afterwards; its removals are listed
    /// in `ExecutionTrace::dedup_actions`.
    pub fragment_length: usize,
    pub shared_state_writes: Vec<StateKey>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: BTreeMap<String, String>,
}

impl TraceEntry {
    pub fn skip_reason(&self) -> Option<&str> {
        match &self.outcome {
            ModuleOutcome::Skipped { reason } => Some(reason),
            _ => None,
        }
    }
}

/// Explainability record for one composition. Never sent to the model.
#[derive(Debug, Clone, Serialize)]
pub struct ExecutionTrace {
    pub phase: CompositionPhase,
    pub entries: Vec<TraceEntry>,
    pub dedup_actions: Vec<DedupAction>,
}

impl Default for ExecutionTrace {
    fn default() -> Self {
        Self {
            phase: CompositionPhase::NotStarted,
            entries: Vec::new(),
            dedup_actions: Vec::new(),
        }
    }
}

impl ExecutionTrace {
    pub fn entry(&self, module_id: &str) -> Option<&TraceEntry> {
        self.entries.iter().find(|e| e.module_id == module_id)
    }

    /// True if at least one module failed; the prompt is usable but must be reported.
    pub fn degraded(&self) -> bool {
        self.entries
            .iter()
            .any(|e| matches!(e.outcome, ModuleOutcome::Failed { .. }))
    }

    pub fn failed_modules(&self) -> Vec<&str> {
        self.entries
            .iter()
            .filter(|e| matches!(e.outcome, ModuleOutcome::Failed { .. }))
            .map(|e| e.module_id.as_str())
            .collect()
    }
}
