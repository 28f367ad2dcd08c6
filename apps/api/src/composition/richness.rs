//! Context richness: how much usable context a request carries, in [0, 1].
//!
//! This is the single adaptive signal: the context module publishes it and every
//! module that changes its rendering by richness reads the published tier.

use serde::{Deserialize, Serialize};

use crate::composition::enrichment::EnrichedContext;

pub const RICH_THRESHOLD: f64 = 0.80;
pub const MODERATE_THRESHOLD: f64 = 0.50;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RichnessWeights {
    /// Cap on the context-density term (items / 10).
    pub density_cap: f64,
    /// Multiplier on the average external source confidence.
    pub source_weight: f64,
    /// Cap on the abbreviation term (count / 5).
    pub abbreviation_cap: f64,
    /// Multiplier on the average per-field confidence.
    pub residual_weight: f64,
}

impl Default for RichnessWeights {
    fn default() -> Self {
        Self {
            density_cap: 0.30,
            source_weight: 0.40,
            abbreviation_cap: 0.20,
            residual_weight: 0.10,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContextTier {
    Rich,
    Moderate,
    Minimal,
}

impl ContextTier {
    pub fn from_score(score: f64) -> Self {
        match score {
            s if s >= RICH_THRESHOLD => ContextTier::Rich,
            s if s >= MODERATE_THRESHOLD => ContextTier::Moderate,
            _ => ContextTier::Minimal,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ContextTier::Rich => "rich",
            ContextTier::Moderate => "moderate",
            ContextTier::Minimal => "minimal",
        }
    }
}

/// Per-term contributions, kept for tracing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RichnessBreakdown {
    pub density: f64,
    pub sources: f64,
    pub abbreviations: f64,
    pub residual: f64,
    pub total: f64,
}

/// density + sources + abbreviations + residual, each capped, total clamped to 1.0.
pub fn breakdown(enriched: &EnrichedContext, weights: &RichnessWeights) -> RichnessBreakdown {
    let density = (enriched.total_items() as f64 / 10.0).min(weights.density_cap);

    let sources = average(enriched.sources.iter().map(|s| s.confidence)) * weights.source_weight;

    let abbreviations =
        (enriched.abbreviations.len() as f64 / 5.0).min(weights.abbreviation_cap);

    let residual = average(enriched.field_confidence.values().copied()) * weights.residual_weight;

    let total = (density + sources + abbreviations + residual).clamp(0.0, 1.0);

    RichnessBreakdown {
        density,
        sources,
        abbreviations,
        residual,
        total,
    }
}

fn average(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, count) = values.fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}
