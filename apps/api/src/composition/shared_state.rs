//! Typed inter-module bus.
//!
//! Every key is a variant of `StateKey`, carries exactly one value type (the
//! matching `StateValue` variant) and has exactly one producer module. Unknown
//! keys and wrongly typed values cannot be expressed; a write by the wrong
//! producer or a second write to the same key is a `ContractViolation`.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use crate::composition::module::ModuleId;
use crate::composition::modules::role::WordType;
use crate::composition::modules::semantic_category::SemanticCategory;
use crate::composition::richness::ContextTier;
use crate::errors::ContractViolation;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StateKey {
    WordType,
    RichnessScore,
    ContextTier,
    ContextRendered,
    ContextValues,
    SemanticCategory,
    ForbiddenTerms,
    TemplateKey,
}

impl StateKey {
    pub const ALL: [StateKey; 8] = [
        StateKey::WordType,
        StateKey::RichnessScore,
        StateKey::ContextTier,
        StateKey::ContextRendered,
        StateKey::ContextValues,
        StateKey::SemanticCategory,
        StateKey::ForbiddenTerms,
        StateKey::TemplateKey,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            StateKey::WordType => "word_type",
            StateKey::RichnessScore => "richness_score",
            StateKey::ContextTier => "context_tier",
            StateKey::ContextRendered => "context_rendered",
            StateKey::ContextValues => "context_values",
            StateKey::SemanticCategory => "semantic_category",
            StateKey::ForbiddenTerms => "forbidden_terms",
            StateKey::TemplateKey => "template_key",
        }
    }

    /// The only module allowed to publish this key.
    pub fn producer(&self) -> ModuleId {
        match self {
            StateKey::WordType => ModuleId::Role,
            StateKey::RichnessScore
            | StateKey::ContextTier
            | StateKey::ContextRendered
            | StateKey::ContextValues => ModuleId::ContextRender,
            StateKey::SemanticCategory => ModuleId::SemanticCategory,
            StateKey::ForbiddenTerms => ModuleId::Constraint,
            StateKey::TemplateKey => ModuleId::Template,
        }
    }
}

impl fmt::Display for StateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A value together with the key it is published under.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "key", content = "value", rename_all = "snake_case")]
pub enum StateValue {
    WordType(WordType),
    RichnessScore(f64),
    ContextTier(ContextTier),
    ContextRendered(bool),
    ContextValues(Vec<String>),
    SemanticCategory(SemanticCategory),
    ForbiddenTerms(Vec<String>),
    TemplateKey(String),
}

impl StateValue {
    pub fn key(&self) -> StateKey {
        match self {
            StateValue::WordType(_) => StateKey::WordType,
            StateValue::RichnessScore(_) => StateKey::RichnessScore,
            StateValue::ContextTier(_) => StateKey::ContextTier,
            StateValue::ContextRendered(_) => StateKey::ContextRendered,
            StateValue::ContextValues(_) => StateKey::ContextValues,
            StateValue::SemanticCategory(_) => StateKey::SemanticCategory,
            StateValue::ForbiddenTerms(_) => StateKey::ForbiddenTerms,
            StateValue::TemplateKey(_) => StateKey::TemplateKey,
        }
    }
}

/// Per-request shared state. Created empty for every composition and dropped with it.
#[derive(Debug, Default, Clone)]
pub struct SharedState {
    entries: BTreeMap<StateKey, StateValue>,
}

impl SharedState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Publishes `value` on behalf of `writer`.
    pub fn publish(&mut self, writer: ModuleId, value: StateValue) -> Result<StateKey, ContractViolation> {
        let key = value.key();
        let owner = key.producer();
        if owner != writer {
            return Err(ContractViolation::WrongProducer {
                key,
                owner: owner.name(),
                writer: writer.name(),
            });
        }
        if self.entries.contains_key(&key) {
            return Err(ContractViolation::DuplicateWrite {
                key,
                writer: writer.name(),
            });
        }
        self.entries.insert(key, value);
        Ok(key)
    }

    pub fn word_type(&self) -> Option<WordType> {
        match self.entries.get(&StateKey::WordType) {
            Some(StateValue::WordType(w)) => Some(*w),
            _ => None,
        }
    }

    pub fn richness_score(&self) -> Option<f64> {
        match self.entries.get(&StateKey::RichnessScore) {
            Some(StateValue::RichnessScore(s)) => Some(*s),
            _ => None,
        }
    }

    pub fn context_tier(&self) -> Option<ContextTier> {
        match self.entries.get(&StateKey::ContextTier) {
            Some(StateValue::ContextTier(t)) => Some(*t),
            _ => None,
        }
    }

    /// `false` until the context module has rendered the context block.
    pub fn context_rendered(&self) -> bool {
        matches!(
            self.entries.get(&StateKey::ContextRendered),
            Some(StateValue::ContextRendered(true))
        )
    }

    pub fn context_values(&self) -> Option<&[String]> {
        match self.entries.get(&StateKey::ContextValues) {
            Some(StateValue::ContextValues(v)) => Some(v.as_slice()),
            _ => None,
        }
    }

    pub fn semantic_category(&self) -> Option<SemanticCategory> {
        match self.entries.get(&StateKey::SemanticCategory) {
            Some(StateValue::SemanticCategory(c)) => Some(*c),
            _ => None,
        }
    }

    pub fn forbidden_terms(&self) -> Option<&[String]> {
        match self.entries.get(&StateKey::ForbiddenTerms) {
            Some(StateValue::ForbiddenTerms(v)) => Some(v.as_slice()),
            _ => None,
        }
    }

    pub fn template_key(&self) -> Option<&str> {
        match self.entries.get(&StateKey::TemplateKey) {
            Some(StateValue::TemplateKey(k)) => Some(k.as_str()),
            _ => None,
        }
    }

    /// Fails with `MissingKey` unless `key` has been published.
    pub fn require(&self, key: StateKey, consumer: ModuleId) -> Result<&StateValue, ContractViolation> {
        self.entries
            .get(&key)
            .ok_or_else(|| ContractViolation::MissingKey {
                key,
                consumer: consumer.name(),
            })
    }
}
