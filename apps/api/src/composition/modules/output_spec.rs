use crate::composition::module::{ModuleContext, ModuleId, ModuleOutput, PromptModule};
use crate::composition::prompts::{LENGTH_WARNING, OUTPUT_SPEC};
use crate::errors::ModuleError;

/// Fixed output format; the length warning only appears for non-default bounds.
pub struct OutputSpecModule;

impl PromptModule for OutputSpecModule {
    fn id(&self) -> ModuleId {
        ModuleId::OutputSpec
    }

    fn execute(&self, ctx: &ModuleContext<'_>) -> Result<ModuleOutput, ModuleError> {
        let bounds = ctx.enriched.bounds;
        if bounds.is_default() {
            return Ok(ModuleOutput::fragment(OUTPUT_SPEC).with_metadata("length_warning", false));
        }

        let warning = LENGTH_WARNING
            .replace("{min}", &bounds.min_chars.to_string())
            .replace("{max}", &bounds.max_chars.to_string());
        Ok(ModuleOutput::fragment(format!("{OUTPUT_SPEC}\n{warning}"))
            .with_metadata("length_warning", true))
    }
}
