//! The single owner of context rendering.
//!
//! Computes the richness score, renders every context value exactly once and
//! publishes the values so later modules can refer to them without printing them.

use crate::composition::enrichment::EnrichedContext;
use crate::composition::module::{ModuleContext, ModuleId, ModuleOutput, PromptModule};
use crate::composition::prompts::{
    CONTEXT_HEADING, CONTEXT_MODERATE_INTRO, CONTEXT_NONE, CONTEXT_RICH_INTRO,
};
use crate::composition::richness::{self, ContextTier, RichnessWeights};
use crate::composition::shared_state::StateValue;
use crate::errors::ModuleError;

pub struct ContextRenderModule {
    weights: RichnessWeights,
}

impl ContextRenderModule {
    pub fn new(weights: RichnessWeights) -> Self {
        Self { weights }
    }
}

impl Default for ContextRenderModule {
    fn default() -> Self {
        Self::new(RichnessWeights::default())
    }
}

impl PromptModule for ContextRenderModule {
    fn id(&self) -> ModuleId {
        ModuleId::ContextRender
    }

    fn execute(&self, ctx: &ModuleContext<'_>) -> Result<ModuleOutput, ModuleError> {
        let enriched = ctx.enriched;
        let breakdown = richness::breakdown(enriched, &self.weights);
        let tier = ContextTier::from_score(breakdown.total);

        // Without adaptive formatting every non-empty context gets the moderate layout.
        let layout = if ctx.config.adaptive_formatting {
            tier
        } else {
            ContextTier::Moderate
        };

        let fragment = if enriched.is_empty() {
            CONTEXT_NONE.to_string()
        } else {
            match layout {
                ContextTier::Rich => render_rich(enriched),
                ContextTier::Moderate => format!(
                    "{CONTEXT_HEADING}\n{CONTEXT_MODERATE_INTRO}\n{}",
                    flat_line("Context", enriched)
                ),
                ContextTier::Minimal => {
                    format!("{CONTEXT_HEADING}\n{}", flat_line("Required context", enriched))
                }
            }
        };

        Ok(ModuleOutput::fragment(fragment)
            .publish(StateValue::RichnessScore(breakdown.total))
            .publish(StateValue::ContextTier(tier))
            .publish(StateValue::ContextValues(enriched.values()))
            .publish(StateValue::ContextRendered(true))
            .with_metadata("tier", tier.as_str())
            .with_metadata("score", format!("{:.2}", breakdown.total))
            .with_metadata("density", format!("{:.2}", breakdown.density))
            .with_metadata("sources", format!("{:.2}", breakdown.sources))
            .with_metadata("abbreviations", format!("{:.2}", breakdown.abbreviations))
            .with_metadata("residual", format!("{:.2}", breakdown.residual)))
    }
}

/// A value with its expansion appended when one was detected: `OM (Openbaar Ministerie)`.
fn display_value(enriched: &EnrichedContext, value: &str) -> String {
    match enriched.expansion_for(value) {
        Some(expansion) => format!("{value} ({expansion})"),
        None => value.to_string(),
    }
}

fn flat_line(label: &str, enriched: &EnrichedContext) -> String {
    let values: Vec<String> = enriched
        .values()
        .iter()
        .map(|v| display_value(enriched, v))
        .collect();
    format!("{label}: {}", values.join(", "))
}

fn render_rich(enriched: &EnrichedContext) -> String {
    let mut lines = vec![CONTEXT_HEADING.to_string(), CONTEXT_RICH_INTRO.to_string()];

    for (field, values) in enriched.fields() {
        if values.is_empty() {
            continue;
        }
        lines.push(format!("{}:", field.label()));
        lines.extend(values.iter().map(|v| format!("  - {}", display_value(enriched, v))));
    }

    if !enriched.sources.is_empty() {
        lines.push("Sources:".to_string());
        lines.extend(enriched.sources.iter().map(|s| {
            format!("  - [{}, confidence {:.2}] {}", s.source, s.confidence, s.snippet)
        }));
    }

    lines.join("\n")
}
