//! Cue lexicons — named groups of surface strings matched as literal
//! substrings. Cue matching is deliberately lexical: unknown tags and
//! unmatched text degrade to "no match", never to an error.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Failure while loading a configuration table from RON.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("RON deserialization error: {0}")]
    Ron(#[from] ron::error::SpannedError),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// A map from cue-group tag to the surface strings that satisfy it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Lexicon {
    pub groups: FxHashMap<String, Vec<String>>,
}

impl Lexicon {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a cue group, replacing any previous group with the same tag.
    pub fn insert(&mut self, tag: &str, cues: &[&str]) {
        self.groups.insert(
            tag.to_string(),
            cues.iter().map(|c| (*c).to_string()).collect(),
        );
    }

    /// True if any cue of `tag`'s group occurs in `text` as a substring.
    /// Unknown tags match nothing.
    pub fn matches(&self, tag: &str, text: &str) -> bool {
        self.groups
            .get(tag)
            .is_some_and(|cues| cues.iter().any(|cue| text.contains(cue.as_str())))
    }

    /// Load a lexicon from a RON file mapping tags to cue lists.
    pub fn load_from_ron(path: &Path) -> Result<Lexicon, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse_ron(&contents)
    }

    /// Parse a lexicon from a RON string.
    pub fn parse_ron(input: &str) -> Result<Lexicon, ConfigError> {
        let groups: FxHashMap<String, Vec<String>> = ron::from_str(input)?;
        Ok(Lexicon { groups })
    }

    /// Merge another lexicon into this one. Groups from `other` override
    /// groups in `self` with the same tag.
    pub fn merge(&mut self, other: Lexicon) {
        for (tag, cues) in other.groups {
            self.groups.insert(tag, cues);
        }
    }
}

/// Returns the first term of `terms` that occurs in `text`, if any.
pub fn first_match<'a>(text: &str, terms: &'a [String]) -> Option<&'a str> {
    terms
        .iter()
        .find(|term| text.contains(term.as_str()))
        .map(String::as_str)
}
