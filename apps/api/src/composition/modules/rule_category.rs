use crate::composition::module::{ModuleContext, ModuleId, ModuleOutput, PromptModule, Readiness};
use crate::composition::prompts::{EXAMPLE_BAD_LABEL, EXAMPLE_GOOD_LABEL};
use crate::errors::ModuleError;
use crate::models::rule::{RuleCategory, RulePriority, RuleRecord};

/// Renders every rule of one category. One instance per category; the
/// category prefix is the only thing that differs between them.
pub struct RuleCategoryModule {
    category: RuleCategory,
}

impl RuleCategoryModule {
    pub fn new(category: RuleCategory) -> Self {
        Self { category }
    }
}

impl PromptModule for RuleCategoryModule {
    fn id(&self) -> ModuleId {
        ModuleId::RuleCategory(self.category)
    }

    fn validate_input(&self, ctx: &ModuleContext<'_>) -> Readiness {
        if ctx.rules.count_in(self.category) == 0 {
            Readiness::Skip(format!("no {} rules loaded", self.category.prefix()))
        } else {
            Readiness::Ready
        }
    }

    fn execute(&self, ctx: &ModuleContext<'_>) -> Result<ModuleOutput, ModuleError> {
        let mut blocks = vec![format!("### {}:", self.category.heading())];
        let mut rendered = 0usize;
        for rule in ctx.rules.by_category(self.category) {
            blocks.push(render_rule(rule, ctx.config.include_examples));
            rendered += 1;
        }

        Ok(ModuleOutput::fragment(blocks.join("\n"))
            .with_metadata("category", self.category.prefix())
            .with_metadata("rules", rendered))
    }
}

fn render_rule(rule: &RuleRecord, include_examples: bool) -> String {
    let marker = if rule.priority == RulePriority::High {
        " (required)"
    } else {
        ""
    };
    let mut out = format!(
        "- {}{marker}: {}\n  Test question: {}",
        rule.id, rule.text, rule.test_question
    );
    if include_examples {
        if let Some((good, bad)) = rule.example_pair() {
            out.push_str(&format!(
                "\n  {EXAMPLE_GOOD_LABEL} {good}\n  {EXAMPLE_BAD_LABEL} {bad}"
            ));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::composition::options::PromptConfig;
    use crate::composition::test_support::Fixture;
    use crate::models::request::GenerationRequest;

    #[test]
    fn test_renders_only_its_own_category() {
        let fixture = Fixture::new(GenerationRequest::new("toezicht"));
        let ctx = fixture.context();
        let out = RuleCategoryModule::new(RuleCategory::Arai).execute(&ctx).unwrap();

        assert!(out.fragment.starts_with("### General rules (ARAI):"));
        assert!(out.fragment.contains("ARAI-01"));
        assert!(!out.fragment.contains("CON-01"));
        assert_eq!(out.metadata["rules"], "1");
    }

    #[test]
    fn test_examples_follow_include_examples() {
        let module = RuleCategoryModule::new(RuleCategory::Ess);

        let with = Fixture::new(GenerationRequest::new("toezicht"));
        let text = module.execute(&with.context()).unwrap().fragment;
        assert!(text.contains("Correct: register: structured collection"));
        assert!(text.contains("Incorrect: register: used to track"));

        let without = Fixture::new(GenerationRequest::new("toezicht")).with_config(PromptConfig {
            include_examples: false,
            ..PromptConfig::default()
        });
        let text = module.execute(&without.context()).unwrap().fragment;
        assert!(!text.contains("Correct:"));
    }

    #[test]
    fn test_rule_without_pair_renders_no_examples() {
        let fixture = Fixture::new(GenerationRequest::new("toezicht"));
        let text = RuleCategoryModule::new(RuleCategory::Con)
            .execute(&fixture.context())
            .unwrap()
            .fragment;
        assert!(text.contains("Test question: Does the definition satisfy CON-01?"));
        assert!(!text.contains("Correct:"));
    }

    #[test]
    fn test_empty_category_is_skipped() {
        let fixture = Fixture::new(GenerationRequest::new("toezicht"));
        let readiness = RuleCategoryModule::new(RuleCategory::Sam).validate_input(&fixture.context());
        assert!(matches!(readiness, Readiness::Skip(reason) if reason.contains("SAM")));
    }

    #[test]
    fn test_high_priority_rules_are_marked() {
        let mut record = crate::composition::test_support::rule("VER-01", None, None);
        record.priority = RulePriority::High;
        assert!(render_rule(&record, true).starts_with("- VER-01 (required):"));
    }
}
