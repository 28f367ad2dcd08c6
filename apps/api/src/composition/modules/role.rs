use serde::{Deserialize, Serialize};

use crate::composition::module::{ModuleContext, ModuleId, ModuleOutput, PromptModule};
use crate::composition::prompts::ROLE_PREAMBLE;
use crate::composition::shared_state::StateValue;
use crate::errors::ModuleError;

/// Lexical class of the term, derived from its Dutch suffix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WordType {
    Verb,
    Deverbal,
    Other,
}

impl WordType {
    pub fn as_str(&self) -> &'static str {
        match self {
            WordType::Verb => "verb",
            WordType::Deverbal => "deverbal",
            WordType::Other => "other",
        }
    }
}

/// Nominalisations: "-ing" (handeling), "-atie" (registratie), "-heid" (bevoegdheid).
const DEVERBAL_SUFFIXES: &[&str] = &["ing", "atie", "heid"];

/// Infinitives end in "-en" (toetsen, handhaven).
const VERB_SUFFIX: &str = "en";

/// Classifies the last word of the term.
pub fn classify_term(term: &str) -> WordType {
    let last = term
        .split_whitespace()
        .last()
        .unwrap_or_default()
        .to_lowercase();

    if DEVERBAL_SUFFIXES.iter().any(|s| last.ends_with(s)) {
        WordType::Deverbal
    } else if last.len() > VERB_SUFFIX.len() && last.ends_with(VERB_SUFFIX) {
        WordType::Verb
    } else {
        WordType::Other
    }
}

pub struct RoleModule;

impl PromptModule for RoleModule {
    fn id(&self) -> ModuleId {
        ModuleId::Role
    }

    fn execute(&self, ctx: &ModuleContext<'_>) -> Result<ModuleOutput, ModuleError> {
        let word_type = classify_term(&ctx.term);
        Ok(ModuleOutput::fragment(ROLE_PREAMBLE.replace("{term}", &ctx.term))
            .publish(StateValue::WordType(word_type))
            .with_metadata("word_type", word_type.as_str()))
    }
}
