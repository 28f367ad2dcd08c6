//! Fixtures shared by the composition unit tests.

use crate::composition::enrichment::EnrichedContext;
use crate::composition::module::{ModuleContext, ModuleOutput, PromptModule};
use crate::composition::options::PromptConfig;
use crate::models::request::{ExternalSource, GenerationRequest};
use crate::models::rule::RuleRecord;
use crate::rules::RuleSource;

/// Owns everything a `ModuleContext` borrows.
pub struct Fixture {
    pub enriched: EnrichedContext,
    pub config: PromptConfig,
    pub rules: RuleSource,
}

impl Fixture {
    pub fn new(request: GenerationRequest) -> Self {
        Self {
            enriched: EnrichedContext::build(&request).unwrap(),
            config: PromptConfig::default(),
            rules: sample_rules(),
        }
    }

    pub fn with_config(mut self, config: PromptConfig) -> Self {
        self.config = config;
        self
    }

    pub fn context(&self) -> ModuleContext<'_> {
        ModuleContext::new(&self.enriched, &self.config, &self.rules)
    }
}

/// Executes `module` and applies its writes the way the orchestrator does.
pub fn run(module: &dyn PromptModule, ctx: &mut ModuleContext<'_>) -> ModuleOutput {
    let output = module.execute(ctx).unwrap();
    for value in &output.writes {
        ctx.shared.publish(module.id(), value.clone()).unwrap();
    }
    ctx.executed.insert(module.id());
    output
}

pub fn rule(id: &str, good: Option<&str>, bad: Option<&str>) -> RuleRecord {
    RuleRecord {
        id: id.to_string(),
        text: format!("Rule text for {id}."),
        test_question: format!("Does the definition satisfy {id}?"),
        good_examples: good.map(str::to_string).into_iter().collect(),
        bad_examples: bad.map(str::to_string).into_iter().collect(),
        priority: Default::default(),
    }
}

/// One rule in every category except SAM, which is left empty on purpose.
pub fn sample_rules() -> RuleSource {
    RuleSource::from_records(vec![
        rule("ARAI-01", Some("supervision: activity of checking"), Some("supervision: to check")),
        rule("CON-01", None, None),
        rule("ESS-01", Some("register: structured collection"), Some("register: used to track")),
        rule("INT-01", None, None),
        rule("STR-01", None, None),
        rule("VER-01", None, None),
    ])
    .unwrap()
}

/// term "werkwoord", org [OM, Reclassering], legal [Strafrecht], one source at 0.95, hint "type".
pub fn scenario_b_request() -> GenerationRequest {
    GenerationRequest {
        organizational_context: vec!["OM".into(), "Reclassering".into()],
        legal_context: vec!["Strafrecht".into()],
        sources: vec![ExternalSource {
            source: "wetten.overheid.nl".into(),
            snippet: "Een werkwoord in de zin van deze regeling.".into(),
            confidence: 0.95,
        }],
        category_hint: Some("type".into()),
        ..GenerationRequest::new("werkwoord")
    }
}
