// Prompt composition engine: turns a GenerationRequest into the single
// instruction sent to the language model.

pub mod dedup;
pub mod enrichment;
pub mod handlers;
pub mod module;
pub mod modules;
pub mod options;
pub mod orchestrator;
pub mod prompts;
pub mod richness;
pub mod scheduler;
pub mod shared_state;
pub mod trace;

#[cfg(test)]
mod scenario_tests;
#[cfg(test)]
pub(crate) mod test_support;

pub use options::PromptConfig;
pub use orchestrator::{Composition, Orchestrator};
