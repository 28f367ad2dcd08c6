//! The long-lived, read-only catalogue of guidance rules.
//!
//! Loaded once at startup and shared behind an `Arc`; nothing mutates it after
//! construction, so concurrent reads need no locking.

use std::collections::{BTreeMap, HashSet};
use std::path::Path;

use tracing::info;

use crate::errors::ConfigurationError;
use crate::models::rule::{RuleCategory, RuleRecord};

#[derive(Debug, Clone)]
pub struct RuleSource {
    records: Vec<RuleRecord>,
    by_category: BTreeMap<RuleCategory, Vec<usize>>,
}

impl RuleSource {
    /// Validates and indexes an ordered list of records.
    ///
    /// Fails on an empty set, an empty id/text/test question, an unknown id
    /// prefix, or a duplicate id.
    pub fn from_records(records: Vec<RuleRecord>) -> Result<Self, ConfigurationError> {
        if records.is_empty() {
            return Err(ConfigurationError::EmptyRuleSet);
        }

        let mut seen = HashSet::new();
        let mut by_category: BTreeMap<RuleCategory, Vec<usize>> = BTreeMap::new();

        for (index, record) in records.iter().enumerate() {
            let category = validate_record(record)?;
            if !seen.insert(record.id.as_str()) {
                return Err(ConfigurationError::DuplicateRule(record.id.clone()));
            }
            by_category.entry(category).or_default().push(index);
        }

        Ok(Self {
            records,
            by_category,
        })
    }

    /// Loads rules from a JSON file holding an array of records, or from a
    /// directory of JSON files holding one record each (read in file-name order).
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigurationError> {
        let path = path.as_ref();
        let records = if path.is_dir() {
            read_rule_dir(path)?
        } else {
            let raw = read_file(path)?;
            serde_json::from_str::<Vec<RuleRecord>>(&raw).map_err(|e| {
                ConfigurationError::RuleFile {
                    path: path.display().to_string(),
                    reason: e.to_string(),
                }
            })?
        };

        let source = Self::from_records(records)?;
        info!(
            "Loaded {} rules in {} categories from {}",
            source.len(),
            source.by_category.len(),
            path.display()
        );
        Ok(source)
    }

    /// All records in load order.
    pub fn load_all(&self) -> &[RuleRecord] {
        &self.records
    }

    pub fn by_category(&self, category: RuleCategory) -> impl Iterator<Item = &RuleRecord> + '_ {
        self.by_category
            .get(&category)
            .into_iter()
            .flatten()
            .map(|&i| &self.records[i])
    }

    pub fn count_in(&self, category: RuleCategory) -> usize {
        self.by_category.get(&category).map_or(0, Vec::len)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }
}

fn validate_record(record: &RuleRecord) -> Result<RuleCategory, ConfigurationError> {
    let malformed = |reason: &str| ConfigurationError::MalformedRule {
        id: record.id.clone(),
        reason: reason.to_string(),
    };

    if record.id.trim().is_empty() {
        return Err(malformed("missing id"));
    }
    let category = record
        .category()
        .ok_or_else(|| malformed("id must be <PREFIX>-<number> with a known category prefix"))?;
    if record.text.trim().is_empty() {
        return Err(malformed("missing text"));
    }
    if record.test_question.trim().is_empty() {
        return Err(malformed("missing test question"));
    }
    Ok(category)
}

fn read_file(path: &Path) -> Result<String, ConfigurationError> {
    std::fs::read_to_string(path).map_err(|e| ConfigurationError::RuleFile {
        path: path.display().to_string(),
        reason: e.to_string(),
    })
}

fn read_rule_dir(dir: &Path) -> Result<Vec<RuleRecord>, ConfigurationError> {
    let io_err = |e: std::io::Error| ConfigurationError::RuleFile {
        path: dir.display().to_string(),
        reason: e.to_string(),
    };

    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(io_err)? {
        let path = entry.map_err(io_err)?.path();
        if path.extension().is_some_and(|ext| ext == "json") {
            files.push(path);
        }
    }
    files.sort();

    files
        .iter()
        .map(|file| {
            let raw = read_file(file)?;
            serde_json::from_str::<RuleRecord>(&raw).map_err(|e| ConfigurationError::RuleFile {
                path: file.display().to_string(),
                reason: e.to_string(),
            })
        })
        .collect()
}
