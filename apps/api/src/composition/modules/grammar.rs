use crate::composition::module::{ModuleContext, ModuleId, ModuleOutput, PromptModule};
use crate::composition::modules::role::WordType;
use crate::composition::prompts::{
    GRAMMAR_BASE, GRAMMAR_DETAILED, GRAMMAR_DEVERBAL, GRAMMAR_HEADING, GRAMMAR_OTHER, GRAMMAR_VERB,
};
use crate::errors::ModuleError;

/// Grammar guidance, branching on the word type published by the role module.
///
/// Without a published word type the noun guidance is used.
pub struct GrammarModule;

impl PromptModule for GrammarModule {
    fn id(&self) -> ModuleId {
        ModuleId::Grammar
    }

    fn execute(&self, ctx: &ModuleContext<'_>) -> Result<ModuleOutput, ModuleError> {
        let word_type = ctx.shared.word_type();

        let mut lines = vec![GRAMMAR_HEADING];
        lines.extend_from_slice(GRAMMAR_BASE);
        lines.push(match word_type {
            Some(WordType::Verb) => GRAMMAR_VERB,
            Some(WordType::Deverbal) => GRAMMAR_DEVERBAL,
            Some(WordType::Other) | None => GRAMMAR_OTHER,
        });
        if ctx.config.detailed_guidance {
            lines.extend_from_slice(GRAMMAR_DETAILED);
        }

        Ok(ModuleOutput::fragment(lines.join("\n")).with_metadata(
            "word_type",
            word_type.map_or("unknown", |w| w.as_str()),
        ))
    }
}
