use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::composition::module::{ModuleContext, ModuleId, ModuleOutput, PromptModule, Readiness};
use crate::composition::prompts::{
    SEMANTIC_EXEMPLAR, SEMANTIC_HEADING, SEMANTIC_PROCESS, SEMANTIC_RESULT, SEMANTIC_TYPE,
};
use crate::composition::shared_state::StateValue;
use crate::errors::ModuleError;

/// Ontological category of the defined concept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SemanticCategory {
    Type,
    Process,
    Result,
    Exemplar,
}

impl SemanticCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            SemanticCategory::Type => "type",
            SemanticCategory::Process => "process",
            SemanticCategory::Result => "result",
            SemanticCategory::Exemplar => "exemplar",
        }
    }

    fn guidance(&self) -> &'static str {
        match self {
            SemanticCategory::Type => SEMANTIC_TYPE,
            SemanticCategory::Process => SEMANTIC_PROCESS,
            SemanticCategory::Result => SEMANTIC_RESULT,
            SemanticCategory::Exemplar => SEMANTIC_EXEMPLAR,
        }
    }
}

impl FromStr for SemanticCategory {
    type Err = String;

    /// Accepts the English names and the Dutch labels used by the UI.
    fn from_str(hint: &str) -> Result<Self, Self::Err> {
        match hint.trim().to_lowercase().as_str() {
            "type" | "soort" => Ok(SemanticCategory::Type),
            "process" | "proces" | "activiteit" => Ok(SemanticCategory::Process),
            "result" | "resultaat" => Ok(SemanticCategory::Result),
            "exemplar" | "exemplaar" | "instance" => Ok(SemanticCategory::Exemplar),
            other => Err(format!("unrecognised category hint '{other}'")),
        }
    }
}

/// Publishes the category hint and renders its guidance block.
pub struct SemanticCategoryModule;

impl PromptModule for SemanticCategoryModule {
    fn id(&self) -> ModuleId {
        ModuleId::SemanticCategory
    }

    fn validate_input(&self, ctx: &ModuleContext<'_>) -> Readiness {
        match ctx.enriched.category_hint.as_deref() {
            None => Readiness::Skip("no category hint".to_string()),
            Some(hint) => match hint.parse::<SemanticCategory>() {
                Ok(_) => Readiness::Ready,
                Err(reason) => Readiness::Skip(reason),
            },
        }
    }

    fn execute(&self, ctx: &ModuleContext<'_>) -> Result<ModuleOutput, ModuleError> {
        let category = ctx
            .enriched
            .category_hint
            .as_deref()
            .ok_or_else(|| ModuleError::Execution("no category hint".to_string()))?
            .parse::<SemanticCategory>()
            .map_err(ModuleError::Execution)?;

        Ok(
            ModuleOutput::fragment(format!("{SEMANTIC_HEADING}\n{}", category.guidance()))
                .publish(StateValue::SemanticCategory(category))
                .with_metadata("category", category.as_str()),
        )
    }
}
