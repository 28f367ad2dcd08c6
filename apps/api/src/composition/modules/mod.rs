//! The module catalogue.

pub mod constraint;
pub mod context_render;
pub mod final_task;
pub mod grammar;
pub mod output_spec;
pub mod role;
pub mod rule_category;
pub mod semantic_category;
pub mod template;

use crate::composition::module::PromptModule;
use crate::models::rule::RuleCategory;

use constraint::ConstraintModule;
use context_render::ContextRenderModule;
use final_task::FinalTaskModule;
use grammar::GrammarModule;
use output_spec::OutputSpecModule;
use role::RoleModule;
use rule_category::RuleCategoryModule;
use semantic_category::SemanticCategoryModule;
use template::TemplateModule;

/// Every module in declaration order. Declaration order is the scheduler's
/// final tie-break.
pub fn default_modules() -> Vec<Box<dyn PromptModule>> {
    let mut modules: Vec<Box<dyn PromptModule>> = vec![
        Box::new(RoleModule),
        Box::new(OutputSpecModule),
        Box::new(GrammarModule),
        Box::new(ContextRenderModule::default()),
    ];
    modules.extend(
        RuleCategory::ALL
            .into_iter()
            .map(|category| Box::new(RuleCategoryModule::new(category)) as Box<dyn PromptModule>),
    );
    modules.push(Box::new(SemanticCategoryModule));
    modules.push(Box::new(TemplateModule));
    modules.push(Box::new(ConstraintModule));
    modules.push(Box::new(FinalTaskModule));
    modules
}
