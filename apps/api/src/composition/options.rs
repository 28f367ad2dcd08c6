use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::errors::ConfigurationError;

/// Recognised per-module options. Any other key is a configuration error.
pub const OPTION_KEYS: [&str; 5] = [
    "include_examples",
    "strict_mode",
    "detailed_guidance",
    "adaptive_formatting",
    "confidence_indicators",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptConfig {
    /// Rule modules render one good/bad example pair per rule.
    pub include_examples: bool,
    /// Constraint module adds the strict rejection clause.
    pub strict_mode: bool,
    /// Grammar module adds extended guidance.
    pub detailed_guidance: bool,
    /// Context rendering follows the richness tier; off = flat layout.
    pub adaptive_formatting: bool,
    /// Final task footer carries the richness score.
    pub confidence_indicators: bool,
}

impl Default for PromptConfig {
    fn default() -> Self {
        Self {
            include_examples: true,
            strict_mode: false,
            detailed_guidance: false,
            adaptive_formatting: true,
            confidence_indicators: true,
        }
    }
}

impl PromptConfig {
    /// Returns a copy of `self` with the given option map applied on top.
    pub fn with_overrides(&self, options: &Map<String, Value>) -> Result<Self, ConfigurationError> {
        let mut config = *self;
        for (key, value) in options {
            if !OPTION_KEYS.contains(&key.as_str()) {
                return Err(ConfigurationError::UnknownOption(key.clone()));
            }
            let flag = value
                .as_bool()
                .ok_or_else(|| ConfigurationError::InvalidOptionValue {
                    key: key.clone(),
                    value: value.to_string(),
                })?;
            let slot = match key.as_str() {
                "include_examples" => &mut config.include_examples,
                "strict_mode" => &mut config.strict_mode,
                "detailed_guidance" => &mut config.detailed_guidance,
                "adaptive_formatting" => &mut config.adaptive_formatting,
                "confidence_indicators" => &mut config.confidence_indicators,
                _ => return Err(ConfigurationError::UnknownOption(key.clone())),
            };
            *slot = flag;
        }
        Ok(config)
    }

    /// Parses a JSON object string such as `{"strict_mode": true}` over the defaults.
    pub fn from_json_str(raw: &str) -> Result<Self, ConfigurationError> {
        let value: Value =
            serde_json::from_str(raw).map_err(|_| ConfigurationError::OptionsNotAnObject)?;
        let map = value
            .as_object()
            .ok_or(ConfigurationError::OptionsNotAnObject)?;
        Self::default().with_overrides(map)
    }
}
