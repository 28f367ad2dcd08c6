//! End-to-end composition tests over the full module catalogue and the bundled rules.

use std::collections::BTreeSet;
use std::sync::Arc;

use proptest::prelude::*;

use crate::composition::dedup::count_whole_word;
use crate::composition::module::{
    Dependency, ModuleContext, ModuleId, ModuleOutput, PromptModule, Readiness,
};
use crate::composition::modules::default_modules;
use crate::composition::options::PromptConfig;
use crate::composition::orchestrator::{Composition, Orchestrator};
use crate::composition::prompts::{CONTEXT_NONE, FINAL_MINIMAL, GRAMMAR_HEADING, OUTPUT_SPEC};
use crate::composition::shared_state::{StateKey, StateValue};
use crate::composition::test_support::scenario_b_request;
use crate::composition::trace::ModuleOutcome;
use crate::errors::{ComposeError, ConfigurationError, ContractViolation, ModuleError};
use crate::models::request::{ExternalSource, GenerationRequest};
use crate::models::rule::RuleCategory;
use crate::rules::RuleSource;

const BUNDLED_RULES: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/../../config/rules.json");

fn bundled_rules() -> Arc<RuleSource> {
    Arc::new(RuleSource::load(BUNDLED_RULES).unwrap())
}

fn orchestrator() -> Orchestrator {
    Orchestrator::with_default_modules(bundled_rules()).unwrap()
}

fn compose(request: &GenerationRequest) -> Composition {
    orchestrator()
        .compose(request, &PromptConfig::default())
        .unwrap()
}

/// The CONTEXT block as it appears in the prompt: from its heading up to the
/// next fragment separator.
fn context_region(prompt: &str) -> &str {
    let start = prompt.find("CONTEXT:\n").expect("context block rendered");
    let rest = &prompt[start..];
    let end = rest.find("\n\n").unwrap_or(rest.len());
    &rest[..end]
}

/// Replaces one catalogue module with `replacement`.
fn catalogue_with(replacement: Box<dyn PromptModule>) -> Vec<Box<dyn PromptModule>> {
    let id = replacement.id();
    let mut modules: Vec<Box<dyn PromptModule>> =
        default_modules().into_iter().filter(|m| m.id() != id).collect();
    modules.push(replacement);
    modules
}

struct Failing(ModuleId);

impl PromptModule for Failing {
    fn id(&self) -> ModuleId {
        self.0
    }

    fn execute(&self, _ctx: &ModuleContext<'_>) -> Result<ModuleOutput, ModuleError> {
        Err(ModuleError::Execution("template store unavailable".to_string()))
    }
}

struct Panicking(ModuleId);

impl PromptModule for Panicking {
    fn id(&self) -> ModuleId {
        self.0
    }

    fn execute(&self, _ctx: &ModuleContext<'_>) -> Result<ModuleOutput, ModuleError> {
        panic!("index out of range")
    }
}

/// Panics before it ever gets to run.
struct PanickingValidation(ModuleId);

impl PromptModule for PanickingValidation {
    fn id(&self) -> ModuleId {
        self.0
    }

    fn validate_input(&self, _ctx: &ModuleContext<'_>) -> Readiness {
        panic!("lookup table missing")
    }

    fn execute(&self, _ctx: &ModuleContext<'_>) -> Result<ModuleOutput, ModuleError> {
        Ok(ModuleOutput::fragment("unreachable"))
    }
}

/// Publishes a key it does not own.
struct Trespassing;

impl PromptModule for Trespassing {
    fn id(&self) -> ModuleId {
        ModuleId::Template
    }

    fn execute(&self, _ctx: &ModuleContext<'_>) -> Result<ModuleOutput, ModuleError> {
        Ok(ModuleOutput::fragment("TEMPLATE:").publish(StateValue::ContextRendered(true)))
    }
}

/// A role module that waits for grammar, which itself waits for role.
struct CyclicRole;

impl PromptModule for CyclicRole {
    fn id(&self) -> ModuleId {
        ModuleId::Role
    }

    fn dependencies(&self) -> &'static [Dependency] {
        &[Dependency::Hard(ModuleId::Grammar)]
    }

    fn execute(&self, _ctx: &ModuleContext<'_>) -> Result<ModuleOutput, ModuleError> {
        Ok(ModuleOutput::empty())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Scheduling
// ────────────────────────────────────────────────────────────────────────────

#[test]
fn test_default_execution_order() {
    let order = orchestrator().execution_order();
    let mut expected = vec![
        ModuleId::Role,
        ModuleId::OutputSpec,
        ModuleId::Grammar,
        ModuleId::ContextRender,
    ];
    expected.extend(RuleCategory::ALL.into_iter().map(ModuleId::RuleCategory));
    expected.extend([
        ModuleId::SemanticCategory,
        ModuleId::Template,
        ModuleId::Constraint,
        ModuleId::FinalTask,
    ]);
    assert_eq!(order, expected);
}

#[test]
fn test_cycle_rejected_at_construction() {
    let result = Orchestrator::new(catalogue_with(Box::new(CyclicRole)), bundled_rules());
    match result {
        Err(ConfigurationError::DependencyCycle(members)) => {
            assert!(members.contains(&"role".to_string()));
            assert!(members.contains(&"grammar".to_string()));
        }
        Err(other) => panic!("expected a cycle, got {other}"),
        Ok(_) => panic!("expected a cycle"),
    }
}

#[test]
fn test_missing_hard_dependency_rejected_at_construction() {
    let modules = default_modules()
        .into_iter()
        .filter(|m| m.id() != ModuleId::ContextRender)
        .collect();
    assert!(matches!(
        Orchestrator::new(modules, bundled_rules()),
        Err(ConfigurationError::MissingDependency { .. })
    ));
}

// ────────────────────────────────────────────────────────────────────────────
// Scenarios
// ────────────────────────────────────────────────────────────────────────────

#[test]
fn test_describe_splits_hard_and_soft_dependencies() {
    let descriptors = orchestrator().describe();
    let find = |name: &str| descriptors.iter().find(|d| d.module_id == name).unwrap();

    let constraint = find("constraint");
    assert_eq!(constraint.hard_dependencies, vec!["context_render"]);
    assert!(constraint.soft_dependencies.is_empty());

    let template = find("template");
    assert!(template.hard_dependencies.is_empty());
    assert_eq!(template.soft_dependencies, vec!["role", "semantic_category"]);

    let last = descriptors.last().unwrap();
    assert_eq!(last.module_id, "final_task");
    assert_eq!(last.position, descriptors.len() - 1);
}

#[test]
fn test_scenario_no_context() {
    let result = compose(&GenerationRequest::new("toezicht"));
    let trace = &result.trace;

    assert_eq!(result.richness_score, 0.0);
    assert!(result.prompt.contains(CONTEXT_NONE));
    assert!(!result.prompt.contains("CONTEXT:"));
    assert!(result.prompt.contains(FINAL_MINIMAL));

    assert!(trace.entry("template").unwrap().skip_reason().is_some());
    assert_eq!(
        trace.entry("semantic_category").unwrap().skip_reason(),
        Some("no category hint")
    );
    for category in RuleCategory::ALL {
        let name = ModuleId::RuleCategory(category).name();
        assert!(trace.entry(&name).unwrap().ran, "{name}");
        assert!(result.prompt.contains(category.heading()));
    }
    assert!(result.prompt.starts_with("You are an expert in legal terminology"));
    assert!(result.prompt.contains(OUTPUT_SPEC));
    assert!(result.prompt.contains("TASK:\nWrite the definition of \"toezicht\" now."));
    assert!(!result.prompt.contains("context values listed under CONTEXT"));
    assert!(!trace.degraded());

    let contributed: BTreeSet<String> = trace
        .entries
        .iter()
        .filter(|e| e.ran && e.fragment_length > 0)
        .map(|e| e.module_id.clone())
        .collect();
    let mut expected: BTreeSet<String> = [
        ModuleId::Role,
        ModuleId::OutputSpec,
        ModuleId::Grammar,
        ModuleId::ContextRender,
        ModuleId::Constraint,
        ModuleId::FinalTask,
    ]
    .iter()
    .map(ModuleId::name)
    .collect();
    expected.extend(RuleCategory::ALL.map(|c| ModuleId::RuleCategory(c).name()));
    assert_eq!(contributed, expected);
}

#[test]
fn test_example_pair_removed_together() {
    let mut request = GenerationRequest::new("straf");
    request.legal_context = vec!["criminal law".to_string()];
    let result = compose(&request);

    assert!(result.prompt.contains("- CON-01 (required):"));
    assert!(!result.prompt.contains("Correct: penalty:"));
    assert!(!result.prompt.contains("Incorrect: penalty:"));

    let actions: Vec<_> = result
        .trace
        .dedup_actions
        .iter()
        .filter(|a| a.line.contains("penalty:"))
        .collect();
    assert_eq!(actions.len(), 1);
    assert_eq!(actions[0].module_id, "rules_con");
    assert_eq!(
        actions[0].line,
        "Correct: penalty: measure imposed on a person found guilty of an offence\n\
         Incorrect: penalty: measure imposed within the criminal law domain by the prosecution"
    );
}

#[test]
fn test_scenario_rich_context() {
    let result = compose(&scenario_b_request());

    assert!((result.richness_score - 0.88).abs() < 1e-9);
    let context_entry = result.trace.entry("context_render").unwrap();
    assert_eq!(context_entry.metadata["tier"], "rich");

    let region = context_region(&result.prompt);
    assert!(region.contains("Organizational context:"));
    assert!(region.contains("Legal context:"));
    for value in ["OM", "Reclassering", "Strafrecht"] {
        assert_eq!(count_whole_word(&result.prompt, value), 1, "{value}");
        assert_eq!(count_whole_word(region, value), 1, "{value}");
    }

    let constraint = result.trace.entry("constraint").unwrap();
    assert_eq!(constraint.shared_state_writes, vec![StateKey::ForbiddenTerms]);
    assert_eq!(constraint.metadata["forbidden_terms"], "4");
    assert!(result.prompt.contains("any of the 3 context values"));

    assert_eq!(result.prompt.matches("ONTOLOGICAL CATEGORY:").count(), 1);
    assert_eq!(result.prompt.matches("The term denotes a kind of thing.").count(), 1);
    assert_eq!(result.trace.entry("template").unwrap().metadata["template"], "type");
}

#[test]
fn test_scenario_failing_module_degrades() {
    let orchestrator =
        Orchestrator::new(catalogue_with(Box::new(Failing(ModuleId::Template))), bundled_rules())
            .unwrap();
    let result = orchestrator
        .compose(&scenario_b_request(), &PromptConfig::default())
        .unwrap();

    let entry = result.trace.entry("template").unwrap();
    assert!(!entry.ran);
    assert_eq!(
        entry.outcome,
        ModuleOutcome::Failed {
            error: "template store unavailable".into()
        }
    );
    assert!(result.trace.degraded());
    assert_eq!(result.trace.failed_modules(), vec!["template"]);
    assert!(!result.prompt.contains("TEMPLATE:"));
    assert!(result.prompt.contains("TASK:"));
    assert!(result.trace.entries.iter().filter(|e| e.module_id != "template").all(|e| e.ran));
}

#[test]
fn test_panicking_module_is_contained() {
    let orchestrator =
        Orchestrator::new(catalogue_with(Box::new(Panicking(ModuleId::Grammar))), bundled_rules())
            .unwrap();
    let result = orchestrator
        .compose(&GenerationRequest::new("handhaven"), &PromptConfig::default())
        .unwrap();

    match &result.trace.entry("grammar").unwrap().outcome {
        ModuleOutcome::Failed { error } => assert!(error.contains("index out of range")),
        other => panic!("expected failure, got {other:?}"),
    }
    assert!(!result.prompt.contains(GRAMMAR_HEADING));
    assert!(result.prompt.contains("TASK:"));
}

#[test]
fn test_panic_during_validation_is_contained() {
    let orchestrator = Orchestrator::new(
        catalogue_with(Box::new(PanickingValidation(ModuleId::Template))),
        bundled_rules(),
    )
    .unwrap();
    let result = orchestrator
        .compose(&scenario_b_request(), &PromptConfig::default())
        .unwrap();

    let entry = result.trace.entry("template").unwrap();
    assert!(!entry.ran);
    match &entry.outcome {
        ModuleOutcome::Failed { error } => assert!(error.contains("lookup table missing")),
        other => panic!("expected failure, got {other:?}"),
    }
    assert!(result.trace.degraded());
    assert!(!result.prompt.contains("unreachable"));
    assert!(result.prompt.contains("TASK:"));
}

#[test]
fn test_failed_context_producer_does_not_trip_final_assertion() {
    let orchestrator = Orchestrator::new(
        catalogue_with(Box::new(Failing(ModuleId::ContextRender))),
        bundled_rules(),
    )
    .unwrap();
    let result = orchestrator
        .compose(&scenario_b_request(), &PromptConfig::default())
        .unwrap();

    assert!(result.trace.degraded());
    assert_eq!(result.richness_score, 0.0);
    assert!(!result.prompt.contains("context values"));
    assert!(result.trace.entry("final_task").unwrap().ran);
}

#[test]
fn test_wrong_producer_is_fatal() {
    let orchestrator =
        Orchestrator::new(catalogue_with(Box::new(Trespassing)), bundled_rules()).unwrap();
    let err = orchestrator
        .compose(&scenario_b_request(), &PromptConfig::default())
        .unwrap_err();
    assert!(matches!(
        err,
        ComposeError::Contract(ContractViolation::WrongProducer {
            key: StateKey::ContextRendered,
            ..
        })
    ));
}

#[test]
fn test_invalid_request_is_rejected_before_composition() {
    let err = orchestrator()
        .compose(&GenerationRequest::new("   "), &PromptConfig::default())
        .unwrap_err();
    assert!(matches!(err, ComposeError::InvalidRequest(_)));
}

// ────────────────────────────────────────────────────────────────────────────
// Properties
// ────────────────────────────────────────────────────────────────────────────

#[test]
fn test_composition_is_deterministic() {
    let orchestrator = orchestrator();
    let config = PromptConfig::default();
    let first = orchestrator.compose(&scenario_b_request(), &config).unwrap();
    for _ in 0..5 {
        let again = orchestrator.compose(&scenario_b_request(), &config).unwrap();
        assert_eq!(again.prompt, first.prompt);
        assert_eq!(
            serde_json::to_string(&again.trace).unwrap(),
            serde_json::to_string(&first.trace).unwrap()
        );
    }
}

#[test]
fn test_requests_do_not_leak_state() {
    let orchestrator = orchestrator();
    let config = PromptConfig::default();
    let bare = orchestrator
        .compose(&GenerationRequest::new("toezicht"), &config)
        .unwrap();
    orchestrator.compose(&scenario_b_request(), &config).unwrap();
    let again = orchestrator
        .compose(&GenerationRequest::new("toezicht"), &config)
        .unwrap();
    assert_eq!(bare.prompt, again.prompt);
}

#[test]
fn test_fragments_are_separated_by_one_blank_line() {
    let result = compose(&scenario_b_request());
    assert!(!result.prompt.contains("\n\n\n"));
    assert!(!result.prompt.starts_with('\n'));
    assert!(!result.prompt.ends_with('\n'));
}

const CONTEXT_POOL: &[&str] = &[
    "Politie",
    "Gemeente",
    "Belastingdienst",
    "Rechtbank",
    "Jeugdzorg",
    "Bestuursrecht",
    "Vreemdelingenrecht",
    "Reclassering",
    "Strafrecht",
    "OM",
    "DJI",
    "Awb",
];

fn context_list() -> impl Strategy<Value = Vec<String>> {
    prop::sample::subsequence(CONTEXT_POOL, 0..4)
        .prop_map(|values| values.into_iter().map(str::to_string).collect())
}

proptest! {
    #[test]
    fn prop_context_values_render_in_one_region(
        organizational in context_list(),
        legal in context_list(),
        statutory in context_list(),
        confidence in prop::option::of(0.0f64..=1.0),
        adaptive in any::<bool>(),
        strict in any::<bool>(),
    ) {
        let request = GenerationRequest {
            organizational_context: organizational,
            legal_context: legal,
            statutory_basis: statutory,
            sources: confidence
                .map(|c| ExternalSource { source: "lookup".into(), snippet: "fragment".into(), confidence: c })
                .into_iter()
                .collect(),
            category_hint: Some("proces".into()),
            ..GenerationRequest::new("handhaving")
        };
        let config = PromptConfig { adaptive_formatting: adaptive, strict_mode: strict, ..PromptConfig::default() };
        let result = orchestrator().compose(&request, &config).unwrap();

        let values: Vec<String> = request
            .organizational_context
            .iter()
            .chain(&request.legal_context)
            .chain(&request.statutory_basis)
            .cloned()
            .collect();
        if values.is_empty() {
            prop_assert!(result.prompt.contains(CONTEXT_NONE));
        } else {
            let region = context_region(&result.prompt);
            for value in &values {
                let in_region = count_whole_word(region, value);
                prop_assert!(in_region >= 1, "{} missing from context block", value);
                prop_assert_eq!(count_whole_word(&result.prompt, value), in_region, "{} leaked", value);
            }
        }
    }
}
