use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Default character bounds for a generated definition.
pub const DEFAULT_MIN_CHARS: usize = 150;
pub const DEFAULT_MAX_CHARS: usize = 350;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LengthBounds {
    pub min_chars: usize,
    pub max_chars: usize,
}

impl Default for LengthBounds {
    fn default() -> Self {
        Self {
            min_chars: DEFAULT_MIN_CHARS,
            max_chars: DEFAULT_MAX_CHARS,
        }
    }
}

impl LengthBounds {
    pub fn is_default(&self) -> bool {
        *self == Self::default()
    }
}

/// An attributed snippet from an external lookup, resolved by a collaborator
/// before composition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExternalSource {
    pub source: String,
    pub snippet: String,
    pub confidence: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Abbreviation {
    pub short: String,
    pub expansion: String,
}

/// Everything the UI collects for one definition draft.
///
/// All context lists default to empty; `null` is never a valid value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub term: String,
    #[serde(default)]
    pub organizational_context: Vec<String>,
    #[serde(default)]
    pub legal_context: Vec<String>,
    #[serde(default)]
    pub statutory_basis: Vec<String>,
    #[serde(default)]
    pub category_hint: Option<String>,
    #[serde(default)]
    pub length_bounds: Option<LengthBounds>,
    #[serde(default)]
    pub sources: Vec<ExternalSource>,
    #[serde(default)]
    pub abbreviations: Vec<Abbreviation>,
    #[serde(default)]
    pub field_confidence: BTreeMap<String, f64>,
}

impl GenerationRequest {
    pub fn new(term: impl Into<String>) -> Self {
        Self {
            term: term.into(),
            ..Default::default()
        }
    }

    pub fn bounds(&self) -> LengthBounds {
        self.length_bounds.unwrap_or_default()
    }
}
