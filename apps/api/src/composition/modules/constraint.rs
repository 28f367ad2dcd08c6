use crate::composition::enrichment::EnrichedContext;
use crate::composition::module::{ModuleContext, ModuleId, ModuleOutput, PromptModule};
use crate::composition::prompts::{
    CONSTRAINT_BASE, CONSTRAINT_CONTEXT_TERMS, CONSTRAINT_HEADING, CONSTRAINT_STRICT,
};
use crate::composition::shared_state::StateValue;
use crate::errors::ModuleError;

/// Banned patterns plus the forbidden-terms list derived from the published context.
///
/// The context values themselves are never printed here; the line only points
/// back at the CONTEXT block, and the derived list goes to shared state.
pub struct ConstraintModule;

impl PromptModule for ConstraintModule {
    fn id(&self) -> ModuleId {
        ModuleId::Constraint
    }

    fn execute(&self, ctx: &ModuleContext<'_>) -> Result<ModuleOutput, ModuleError> {
        let mut lines = vec![CONSTRAINT_HEADING.to_string()];
        lines.extend(CONSTRAINT_BASE.iter().map(|l| l.to_string()));

        let (forbidden, referenced) = if ctx.shared.context_rendered() {
            let values = ctx.shared.context_values().unwrap_or_default();
            (forbidden_terms(values, ctx.enriched), values.len())
        } else {
            (Vec::new(), 0)
        };
        if referenced > 0 {
            lines.push(CONSTRAINT_CONTEXT_TERMS.replace("{count}", &referenced.to_string()));
        }

        if ctx.config.strict_mode {
            lines.push(CONSTRAINT_STRICT.to_string());
        }

        let count = forbidden.len();
        Ok(ModuleOutput::fragment(lines.join("\n"))
            .publish(StateValue::ForbiddenTerms(forbidden))
            .with_metadata("forbidden_terms", count))
    }
}

/// Published context values followed by their detected expansions.
fn forbidden_terms(values: &[String], enriched: &EnrichedContext) -> Vec<String> {
    let mut terms: Vec<String> = values.to_vec();
    for value in values {
        if let Some(expansion) = enriched.expansion_for(value) {
            if !terms.iter().any(|t| t == expansion) {
                terms.push(expansion.to_string());
            }
        }
    }
    terms
}
