use crate::composition::module::{ModuleContext, ModuleId, ModuleOutput, PromptModule};
use crate::composition::prompts::{
    FINAL_CHECK, FINAL_MINIMAL, FINAL_MODERATE, FINAL_RICH, FINAL_TASK,
};
use crate::composition::richness::ContextTier;
use crate::composition::shared_state::{SharedState, StateKey};
use crate::errors::{ContractViolation, ModuleError};

/// Closing instruction and the single metadata footer.
///
/// Runs last and sees the complete shared state, so it also checks that every
/// producer that executed actually published all of its keys.
pub struct FinalTaskModule;

impl PromptModule for FinalTaskModule {
    fn id(&self) -> ModuleId {
        ModuleId::FinalTask
    }

    fn execute(&self, ctx: &ModuleContext<'_>) -> Result<ModuleOutput, ModuleError> {
        assert_complete(ctx)?;

        let tier = ctx.shared.context_tier().unwrap_or(ContextTier::Minimal);
        let instruction = match tier {
            ContextTier::Rich => FINAL_RICH,
            ContextTier::Moderate => FINAL_MODERATE,
            ContextTier::Minimal => FINAL_MINIMAL,
        };

        let text = format!(
            "{}\n{instruction}\n{FINAL_CHECK}\n\n{}",
            FINAL_TASK.replace("{term}", &ctx.term),
            footer(&ctx.shared, ctx.config.confidence_indicators)
        );
        Ok(ModuleOutput::fragment(text).with_metadata("tier", tier.as_str()))
    }
}

fn assert_complete(ctx: &ModuleContext<'_>) -> Result<(), ContractViolation> {
    for key in StateKey::ALL {
        if ctx.executed.contains(&key.producer()) {
            ctx.shared.require(key, ModuleId::FinalTask)?;
        }
    }
    Ok(())
}

/// One line summarising the published state. Never lists context values.
fn footer(shared: &SharedState, with_score: bool) -> String {
    let mut parts = Vec::new();
    if let Some(tier) = shared.context_tier() {
        parts.push(format!("context={}", tier.as_str()));
    }
    if with_score {
        if let Some(score) = shared.richness_score() {
            parts.push(format!("confidence={score:.2}"));
        }
    }
    if let Some(word_type) = shared.word_type() {
        parts.push(format!("word_type={}", word_type.as_str()));
    }
    if let Some(category) = shared.semantic_category() {
        parts.push(format!("category={}", category.as_str()));
    }
    if let Some(template) = shared.template_key() {
        parts.push(format!("template={template}"));
    }
    if let Some(terms) = shared.forbidden_terms() {
        parts.push(format!("forbidden_terms={}", terms.len()));
    }
    format!("[{}]", parts.join("; "))
}
