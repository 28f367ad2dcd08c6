//! Builds the immutable `EnrichedContext` for one request.
//!
//! Context lists are trimmed and de-duplicated so that every literal value is
//! owned by exactly one field; this is what lets the context module render each
//! value once.

use std::collections::{BTreeMap, HashSet};

use serde::Serialize;

use crate::errors::ComposeError;
use crate::models::request::{Abbreviation, ExternalSource, GenerationRequest, LengthBounds};

/// Justice-domain short forms recognised when they appear as a whole context value.
const KNOWN_ABBREVIATIONS: &[(&str, &str)] = &[
    ("OM", "Openbaar Ministerie"),
    ("ZM", "Zittende Magistratuur"),
    ("DJI", "Dienst Justitiële Inrichtingen"),
    ("KMAR", "Koninklijke Marechaussee"),
    ("NP", "Nationale Politie"),
    ("IND", "Immigratie- en Naturalisatiedienst"),
    ("CJIB", "Centraal Justitieel Incassobureau"),
    ("RvdK", "Raad voor de Kinderbescherming"),
    ("NFI", "Nederlands Forensisch Instituut"),
    ("Sr", "Wetboek van Strafrecht"),
    ("Sv", "Wetboek van Strafvordering"),
    ("Awb", "Algemene wet bestuursrecht"),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ContextField {
    Organizational,
    Legal,
    Statutory,
}

impl ContextField {
    pub fn label(&self) -> &'static str {
        match self {
            ContextField::Organizational => "Organizational context",
            ContextField::Legal => "Legal context",
            ContextField::Statutory => "Statutory basis",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnrichedContext {
    pub term: String,
    pub organizational: Vec<String>,
    pub legal: Vec<String>,
    pub statutory: Vec<String>,
    pub category_hint: Option<String>,
    pub bounds: LengthBounds,
    pub sources: Vec<ExternalSource>,
    pub abbreviations: Vec<Abbreviation>,
    pub field_confidence: BTreeMap<String, f64>,
}

impl EnrichedContext {
    /// Validates the request and derives the enriched view of it.
    pub fn build(request: &GenerationRequest) -> Result<Self, ComposeError> {
        validate_request(request)?;

        let mut seen = HashSet::new();
        let organizational = ordered_unique(&request.organizational_context, &mut seen);
        let legal = ordered_unique(&request.legal_context, &mut seen);
        let statutory = ordered_unique(&request.statutory_basis, &mut seen);

        let mut context = Self {
            term: request.term.trim().to_string(),
            organizational,
            legal,
            statutory,
            category_hint: request
                .category_hint
                .as_deref()
                .map(str::trim)
                .filter(|h| !h.is_empty())
                .map(str::to_string),
            bounds: request.bounds(),
            sources: request.sources.clone(),
            abbreviations: Vec::new(),
            field_confidence: request.field_confidence.clone(),
        };
        context.abbreviations = detect_abbreviations(&context, &request.abbreviations);
        Ok(context)
    }

    pub fn fields(&self) -> [(ContextField, &[String]); 3] {
        [
            (ContextField::Organizational, self.organizational.as_slice()),
            (ContextField::Legal, self.legal.as_slice()),
            (ContextField::Statutory, self.statutory.as_slice()),
        ]
    }

    /// All context values in canonical render order.
    pub fn values(&self) -> Vec<String> {
        self.fields()
            .into_iter()
            .flat_map(|(_, values)| values.iter().cloned())
            .collect()
    }

    pub fn total_items(&self) -> usize {
        self.organizational.len() + self.legal.len() + self.statutory.len()
    }

    pub fn is_empty(&self) -> bool {
        self.total_items() == 0
    }

    pub fn expansion_for(&self, short: &str) -> Option<&str> {
        self.abbreviations
            .iter()
            .find(|a| a.short == short)
            .map(|a| a.expansion.as_str())
    }
}

fn validate_request(request: &GenerationRequest) -> Result<(), ComposeError> {
    let invalid = |msg: String| Err(ComposeError::InvalidRequest(msg));

    if request.term.trim().is_empty() {
        return invalid("term cannot be empty".to_string());
    }
    for source in &request.sources {
        if !is_unit_interval(source.confidence) {
            return invalid(format!(
                "confidence of source '{}' must be within [0, 1], got {}",
                source.source, source.confidence
            ));
        }
    }
    for (field, confidence) in &request.field_confidence {
        if !is_unit_interval(*confidence) {
            return invalid(format!(
                "confidence of field '{field}' must be within [0, 1], got {confidence}"
            ));
        }
    }
    if let Some(bounds) = request.length_bounds {
        if bounds.max_chars == 0 || bounds.min_chars > bounds.max_chars {
            return invalid(format!(
                "length bounds {}..{} are not a valid range",
                bounds.min_chars, bounds.max_chars
            ));
        }
    }
    Ok(())
}

fn is_unit_interval(value: f64) -> bool {
    value.is_finite() && (0.0..=1.0).contains(&value)
}

fn ordered_unique(values: &[String], seen: &mut HashSet<String>) -> Vec<String> {
    values
        .iter()
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .filter(|v| seen.insert(v.to_string()))
        .map(str::to_string)
        .collect()
}

/// Caller-supplied pairs first, then table matches on whole context values.
fn detect_abbreviations(context: &EnrichedContext, supplied: &[Abbreviation]) -> Vec<Abbreviation> {
    let mut found: Vec<Abbreviation> = Vec::new();
    let mut push = |short: &str, expansion: &str| {
        let short = short.trim();
        let expansion = expansion.trim();
        if short.is_empty() || expansion.is_empty() || found.iter().any(|a| a.short == short) {
            return;
        }
        found.push(Abbreviation {
            short: short.to_string(),
            expansion: expansion.to_string(),
        });
    };

    for abbreviation in supplied {
        push(&abbreviation.short, &abbreviation.expansion);
    }
    for value in context.values() {
        if let Some((short, expansion)) = KNOWN_ABBREVIATIONS.iter().find(|(s, _)| *s == value) {
            push(short, expansion);
        }
    }
    found
}
