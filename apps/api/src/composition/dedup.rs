//! Deduplication pass over the assembled fragments.
//!
//! Runs after every module has executed and enforces two things:
//! - a non-trivial line already emitted earlier in the prompt is dropped;
//! - outside the canonical context fragment, a line that names a published
//!   context value (as a whole word) is dropped.
//!
//! A rule's example pair is removed as a whole or not at all.
//!
//! Every removal is reported so the trace shows what the pass changed.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::composition::module::ModuleId;
use crate::composition::prompts::{EXAMPLE_BAD_LABEL, EXAMPLE_GOOD_LABEL};

/// Lines with fewer words than this are structural (separators, labels) and
/// are never treated as duplicates.
const MIN_WORDS_FOR_DEDUP: usize = 4;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum DedupReason {
    RepeatedLine { first_seen_in: String },
    ContextValueOutsideCanonical { value: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DedupAction {
    pub module_id: String,
    pub line: String,
    #[serde(flatten)]
    pub reason: DedupReason,
}

#[derive(Debug, Clone)]
pub struct Fragment {
    pub module: ModuleId,
    pub text: String,
}

pub struct DedupOutcome {
    pub fragments: Vec<Fragment>,
    pub actions: Vec<DedupAction>,
}

/// Applies the pass. `canonical` is the module that owns the context rendering.
pub fn deduplicate(
    fragments: Vec<Fragment>,
    canonical: ModuleId,
    context_values: &[String],
    term: &str,
) -> DedupOutcome {
    let guarded: Vec<&str> = context_values
        .iter()
        .map(String::as_str)
        .filter(|value| !value.is_empty())
        .filter(|value| !value.eq_ignore_ascii_case(term) && count_whole_word(term, value) == 0)
        .collect();

    let mut seen: HashMap<String, ModuleId> = HashMap::new();
    let mut actions = Vec::new();
    let mut kept_fragments = Vec::with_capacity(fragments.len());

    for fragment in fragments {
        let mut kept_lines: Vec<&str> = Vec::new();

        for unit in line_units(&fragment.text) {
            let normalized: Vec<String> = unit.iter().map(|line| normalize(line)).collect();

            let reason = unit.iter().zip(&normalized).find_map(|(line, norm)| {
                if !is_structural(norm) {
                    if let Some(first) = seen.get(norm) {
                        return Some(DedupReason::RepeatedLine {
                            first_seen_in: first.name(),
                        });
                    }
                }
                if fragment.module != canonical {
                    if let Some(value) = guarded.iter().find(|v| count_whole_word(line, v) > 0) {
                        return Some(DedupReason::ContextValueOutsideCanonical {
                            value: value.to_string(),
                        });
                    }
                }
                None
            });

            if let Some(reason) = reason {
                actions.push(DedupAction {
                    module_id: fragment.module.name(),
                    line: unit.iter().map(|l| l.trim()).collect::<Vec<_>>().join("\n"),
                    reason,
                });
                continue;
            }

            for norm in normalized {
                if !is_structural(&norm) {
                    seen.insert(norm, fragment.module);
                }
            }
            kept_lines.extend(unit);
        }

        let text = kept_lines.join("\n").trim_matches('\n').to_string();
        if !text.trim().is_empty() {
            kept_fragments.push(Fragment {
                module: fragment.module,
                text,
            });
        }
    }

    DedupOutcome {
        fragments: kept_fragments,
        actions,
    }
}

/// Counts occurrences of `needle` in `haystack` bounded by non-alphanumeric
/// characters (or the ends of the string). Case-sensitive.
pub fn count_whole_word(haystack: &str, needle: &str) -> usize {
    if needle.is_empty() {
        return 0;
    }
    haystack
        .match_indices(needle)
        .filter(|(start, _)| {
            let before = haystack[..*start].chars().next_back();
            let after = haystack[start + needle.len()..].chars().next();
            !before.is_some_and(char::is_alphanumeric) && !after.is_some_and(char::is_alphanumeric)
        })
        .count()
}

fn is_structural(normalized: &str) -> bool {
    normalized.split(' ').count() < MIN_WORDS_FOR_DEDUP
}

/// Splits a fragment into removal units: single lines, except that an example
/// pair (good line directly followed by bad line) stays one unit.
fn line_units(text: &str) -> Vec<Vec<&str>> {
    let mut units: Vec<Vec<&str>> = Vec::new();
    for line in text.lines() {
        let pairs_with_previous = line.trim_start().starts_with(EXAMPLE_BAD_LABEL)
            && units.last().is_some_and(|unit| {
                unit.len() == 1 && unit[0].trim_start().starts_with(EXAMPLE_GOOD_LABEL)
            });
        match units.last_mut() {
            Some(unit) if pairs_with_previous => unit.push(line),
            _ => units.push(vec![line]),
        }
    }
    units
}

fn normalize(line: &str) -> String {
    line.split_whitespace().collect::<Vec<_>>().join(" ")
}
