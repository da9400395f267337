//! Weighted negative-term lexicon.
//!
//! A lexicon maps category names to a set of case-folded terms and a weight.
//! Loading is permissive: malformed categories are dropped with a warning and
//! a source that cannot be parsed at all yields an empty lexicon, so the
//! monitor always has something defined to score against.
//!
//! Terms are single words. Completed words never contain whitespace or
//! boundary punctuation, so a phrase such as `end it all` could only ever
//! match through the words it contains (`it`, `all`). Such terms are dropped.

use super::tokenizer::{classify, CharClass};
use serde::Deserialize;
use std::collections::{BTreeSet, HashMap};
use std::path::Path;
use thiserror::Error;

/// Lexicon bundled with the binary, used when no lexicon file can be read.
pub const DEFAULT_LEXICON: &str = include_str!("../../assets/lexicon.json");

/// A single weighted category of terms.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LexiconEntry {
    /// Category name (unique key within a lexicon)
    pub category: String,
    /// Case-folded, trimmed, single-word terms
    pub terms: BTreeSet<String>,
    /// Score contributed when any term matches
    pub weight: u32,
}

impl LexiconEntry {
    /// Build an entry, case-folding terms and discarding blank ones and those
    /// that cannot form a single word.
    pub fn new<I, S>(category: impl Into<String>, terms: I, weight: u32) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            category: category.into(),
            terms: terms
                .into_iter()
                .filter_map(|t| fold_term(t.as_ref()))
                .collect(),
            weight,
        }
    }

    /// Entries with no terms are legal but never match.
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }
}

/// Errors raised by the typed parse step.
#[derive(Debug, Error)]
pub enum LexiconParseError {
    #[error("lexicon is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("lexicon top level must be an object, found {0}")]
    NotAnObject(&'static str),
}

/// Read-only snapshot of categories used by the matcher.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Lexicon {
    entries: HashMap<String, LexiconEntry>,
    skipped: Vec<String>,
}

/// On-disk shape of a category. `words` is the key older lexicon files use.
#[derive(Debug, Deserialize)]
struct RawEntry {
    #[serde(alias = "words")]
    terms: Vec<String>,
    weight: i64,
}

impl Lexicon {
    /// Create an empty lexicon. Every word scores zero against it.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a lexicon from already-constructed entries.
    pub fn from_entries(entries: impl IntoIterator<Item = LexiconEntry>) -> Self {
        Self {
            entries: entries
                .into_iter()
                .map(|e| (e.category.clone(), e))
                .collect(),
            skipped: Vec::new(),
        }
    }

    /// Typed parse of a JSON lexicon source.
    ///
    /// Fails only when the source is not a JSON object. Categories that are
    /// missing `terms`/`weight`, carry the wrong types, or have a negative
    /// weight are dropped and listed in [`Lexicon::skipped`].
    pub fn parse(raw: &str) -> Result<Self, LexiconParseError> {
        let value: serde_json::Value = serde_json::from_str(raw)?;
        let map = match value {
            serde_json::Value::Object(map) => map,
            other => return Err(LexiconParseError::NotAnObject(json_kind(&other))),
        };

        let mut lexicon = Self::default();
        for (category, body) in map {
            let raw_entry = match RawEntry::deserialize(&body) {
                Ok(entry) => entry,
                Err(e) => {
                    tracing::warn!(%category, error = %e, "Dropping malformed lexicon category");
                    lexicon.skipped.push(category);
                    continue;
                }
            };

            let weight = match u32::try_from(raw_entry.weight) {
                Ok(w) => w,
                Err(_) => {
                    tracing::warn!(
                        %category,
                        weight = raw_entry.weight,
                        "Dropping lexicon category with out-of-range weight"
                    );
                    lexicon.skipped.push(category);
                    continue;
                }
            };

            let unmatchable: Vec<&str> = raw_entry
                .terms
                .iter()
                .map(|t| t.trim())
                .filter(|t| !t.is_empty() && !is_single_word(t))
                .collect();
            if !unmatchable.is_empty() {
                tracing::warn!(
                    %category,
                    terms = ?unmatchable,
                    "Dropping lexicon terms that are not single words"
                );
            }

            let entry = LexiconEntry::new(category.clone(), &raw_entry.terms, weight);
            if entry.is_empty() {
                tracing::debug!(%category, "Lexicon category has no usable terms");
            }
            lexicon.entries.insert(category, entry);
        }

        lexicon.skipped.sort();
        Ok(lexicon)
    }

    /// Parse with the availability policy: any failure yields an empty lexicon.
    pub fn load(raw: &str) -> Self {
        match Self::parse(raw) {
            Ok(lexicon) => lexicon,
            Err(e) => {
                tracing::warn!(error = %e, "Could not parse lexicon, using empty lexicon");
                Self::empty()
            }
        }
    }

    /// Load from a file, falling back to the bundled lexicon when the file
    /// cannot be read (or no path is given).
    pub fn load_path(path: Option<&Path>) -> Self {
        if let Some(path) = path {
            match std::fs::read_to_string(path) {
                Ok(content) => {
                    let lexicon = Self::load(&content);
                    tracing::info!(
                        path = %path.display(),
                        categories = lexicon.len(),
                        "Loaded lexicon"
                    );
                    return lexicon;
                }
                Err(e) => {
                    tracing::warn!(
                        path = %path.display(),
                        error = %e,
                        "Could not read lexicon file, using bundled lexicon"
                    );
                }
            }
        }
        Self::load(DEFAULT_LEXICON)
    }

    /// Number of categories.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the lexicon holds no categories.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Look up a category by name.
    pub fn get(&self, category: &str) -> Option<&LexiconEntry> {
        self.entries.get(category)
    }

    /// Iterate over all categories in unspecified order.
    pub fn entries(&self) -> impl Iterator<Item = &LexiconEntry> {
        self.entries.values()
    }

    /// Category names, sorted.
    pub fn categories(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.entries.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Categories dropped during parsing, sorted.
    pub fn skipped(&self) -> &[String] {
        &self.skipped
    }
}

fn fold_term(term: &str) -> Option<String> {
    let trimmed = term.trim();
    if trimmed.is_empty() || !is_single_word(trimmed) {
        None
    } else {
        Some(trimmed.to_lowercase())
    }
}

/// Whether the tokenizer could emit this term as (part of) one word.
fn is_single_word(term: &str) -> bool {
    term.chars().all(|c| classify(c) == CharClass::Word)
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}
