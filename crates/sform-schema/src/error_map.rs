//! # Error Map
//!
//! Flat, path-keyed validation messages. An `ErrorMap` is always rebuilt
//! from scratch by a validation pass; nothing patches one incrementally.
//! A missing entry means "valid or not yet validated".

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use sform_core::FieldPath;

/// Mapping from absolute field path to a human-readable message.
///
/// Serialized as a JSON object keyed by dotted paths.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ErrorMap(BTreeMap<FieldPath, String>);

impl ErrorMap {
    /// An empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `message` at `path`, replacing any earlier message there.
    pub fn insert(&mut self, path: FieldPath, message: impl Into<String>) -> Option<String> {
        self.0.insert(path, message.into())
    }

    /// Message recorded at `path`.
    pub fn get(&self, path: &FieldPath) -> Option<&str> {
        self.0.get(path).map(String::as_str)
    }

    /// Message recorded at a dotted path.
    pub fn get_dotted(&self, dotted: &str) -> Option<&str> {
        self.get(&FieldPath::parse_dotted(dotted))
    }

    /// Whether any message is recorded at `path`.
    pub fn contains(&self, path: &FieldPath) -> bool {
        self.0.contains_key(path)
    }

    /// Number of recorded messages.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no messages are recorded.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Entries in path order.
    pub fn iter(&self) -> impl Iterator<Item = (&FieldPath, &str)> {
        self.0.iter().map(|(p, m)| (p, m.as_str()))
    }
}

impl<'a> IntoIterator for &'a ErrorMap {
    type Item = (&'a FieldPath, &'a String);
    type IntoIter = std::collections::btree_map::Iter<'a, FieldPath, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
