use serde::{Deserialize, Serialize};

/// Fixed set of rule categories. Membership is derived from the rule id prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RuleCategory {
    Arai,
    Con,
    Ess,
    Int,
    Sam,
    Str,
    Ver,
}

impl RuleCategory {
    /// Declaration order; also the order in which category modules are catalogued.
    pub const ALL: [RuleCategory; 7] = [
        RuleCategory::Arai,
        RuleCategory::Con,
        RuleCategory::Ess,
        RuleCategory::Int,
        RuleCategory::Sam,
        RuleCategory::Str,
        RuleCategory::Ver,
    ];

    pub fn prefix(&self) -> &'static str {
        match self {
            RuleCategory::Arai => "ARAI",
            RuleCategory::Con => "CON",
            RuleCategory::Ess => "ESS",
            RuleCategory::Int => "INT",
            RuleCategory::Sam => "SAM",
            RuleCategory::Str => "STR",
            RuleCategory::Ver => "VER",
        }
    }

    /// Heading used when the category's rules are rendered into a prompt.
    pub fn heading(&self) -> &'static str {
        match self {
            RuleCategory::Arai => "General rules (ARAI)",
            RuleCategory::Con => "Context rules (CON)",
            RuleCategory::Ess => "Essence rules (ESS)",
            RuleCategory::Int => "Integrity rules (INT)",
            RuleCategory::Sam => "Coherence rules (SAM)",
            RuleCategory::Str => "Structure rules (STR)",
            RuleCategory::Ver => "Form rules (VER)",
        }
    }

    pub fn from_prefix(prefix: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|c| c.prefix().eq_ignore_ascii_case(prefix))
    }

    /// Derives the category from a rule id such as `CON-01` or `ARAI-04SUB1`.
    ///
    /// The suffix after the dash must start with a digit.
    pub fn from_rule_id(id: &str) -> Option<Self> {
        let (prefix, suffix) = id.split_once('-')?;
        if !suffix.chars().next().is_some_and(|c| c.is_ascii_digit()) {
            return None;
        }
        if !suffix.chars().all(|c| c.is_ascii_alphanumeric()) {
            return None;
        }
        // Prefixes are matched exactly; "con-01" is not a valid id.
        Self::ALL.into_iter().find(|c| c.prefix() == prefix)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RulePriority {
    High,
    #[default]
    Medium,
    Low,
}

/// A single immutable guidance rule as stored on disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleRecord {
    pub id: String,
    pub text: String,
    pub test_question: String,
    #[serde(default)]
    pub good_examples: Vec<String>,
    #[serde(default)]
    pub bad_examples: Vec<String>,
    #[serde(default)]
    pub priority: RulePriority,
}

impl RuleRecord {
    pub fn category(&self) -> Option<RuleCategory> {
        RuleCategory::from_rule_id(&self.id)
    }

    /// First good/bad example pair, if both sides exist.
    pub fn example_pair(&self) -> Option<(&str, &str)> {
        match (self.good_examples.first(), self.bad_examples.first()) {
            (Some(good), Some(bad)) => Some((good.as_str(), bad.as_str())),
            _ => None,
        }
    }
}
