use crate::composition::module::{ModuleContext, ModuleId, ModuleOutput, PromptModule, Readiness};
use crate::composition::modules::role::WordType;
use crate::composition::prompts::TEMPLATE_HEADING;
use crate::composition::shared_state::{SharedState, StateValue};
use crate::errors::ModuleError;

/// (key, skeleton, example)
const TEMPLATES: &[(&str, &str, &str)] = &[
    (
        "type",
        "[broader class] that [distinguishing characteristic]",
        "custodial sentence: penalty that deprives the convicted person of liberty",
    ),
    (
        "process",
        "activity in which [actor] [performs which action] in order to [outcome]",
        "hearing: activity in which a court questions the parties in order to establish the facts",
    ),
    (
        "result",
        "[outcome] of [activity] that [distinguishing characteristic]",
        "verdict: decision of a court that concludes the proceedings at first instance",
    ),
    (
        "exemplar",
        "[kind] that is identified by [name, time or place]",
        "Supreme Court: highest court of cassation that is seated in The Hague",
    ),
    (
        "verb",
        "[act] of [object] by [actor] with [effect]",
        "to detain: depriving a suspect of liberty by a competent officer pending investigation",
    ),
    (
        "deverbal",
        "[activity or result] of [object] by [actor]",
        "registration: recording of personal data by the competent authority",
    ),
];

/// Picks the template key: the semantic category first, then a non-generic word type.
fn template_key(shared: &SharedState) -> Option<&'static str> {
    if let Some(category) = shared.semantic_category() {
        return Some(category.as_str());
    }
    match shared.word_type() {
        Some(WordType::Verb) => Some("verb"),
        Some(WordType::Deverbal) => Some("deverbal"),
        Some(WordType::Other) | None => None,
    }
}

/// Renders a definition skeleton. Opts out when neither signal is available.
pub struct TemplateModule;

impl PromptModule for TemplateModule {
    fn id(&self) -> ModuleId {
        ModuleId::Template
    }

    fn validate_input(&self, ctx: &ModuleContext<'_>) -> Readiness {
        match template_key(&ctx.shared) {
            Some(_) => Readiness::Ready,
            None => Readiness::Skip("no semantic category or specific word type".to_string()),
        }
    }

    fn execute(&self, ctx: &ModuleContext<'_>) -> Result<ModuleOutput, ModuleError> {
        let Some(key) = template_key(&ctx.shared) else {
            return Ok(ModuleOutput::empty());
        };
        let (_, skeleton, example) = TEMPLATES
            .iter()
            .find(|(k, _, _)| *k == key)
            .ok_or_else(|| ModuleError::Execution(format!("no template for '{key}'")))?;

        let mut text = format!("{TEMPLATE_HEADING}\nStructure: {skeleton}");
        if ctx.config.include_examples {
            text.push_str(&format!("\nExample: {example}"));
        }

        Ok(ModuleOutput::fragment(text)
            .publish(StateValue::TemplateKey(key.to_string()))
            .with_metadata("template", key))
    }
}
