//! Domain models for documentation pages and extracted facts.

use std::collections::BTreeMap;
use std::collections::btree_map;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// One documentation source file, decoded and identified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentationPage {
    /// Identifier derived from the page heading, or the file stem as fallback.
    pub id: String,
    /// Path the page was read from.
    pub source: PathBuf,
    /// Raw UTF-8 page content.
    pub text: String,
}

/// Facts discovered on a single page. Built once, never mutated afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractedFacts {
    /// Attribute names valid as the second argument to `Fn::GetAtt`,
    /// in document order without duplicates.
    pub get_att_targets: Vec<String>,
    /// Identifiers referenced via `Ref` in prose, in document order
    /// without duplicates. Best-effort.
    pub ref_values: Vec<String>,
}

impl ExtractedFacts {
    pub fn is_empty(&self) -> bool {
        self.get_att_targets.is_empty() && self.ref_values.is_empty()
    }
}

/// Aggregate output mapping page identifier to extracted facts.
///
/// Backed by a `BTreeMap` so iteration and serialization order is
/// lexicographic regardless of discovery order. Holds at most one entry per
/// identifier.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResultSet {
    entries: BTreeMap<String, ExtractedFacts>,
}

impl ResultSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&ExtractedFacts> {
        self.entries.get(id)
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, ExtractedFacts> {
        self.entries.iter()
    }

    /// Record facts for a page. Returns `false` when the identifier is
    /// already present; the existing entry is kept so repeated runs stay
    /// deterministic.
    pub fn insert(&mut self, id: impl Into<String>, facts: ExtractedFacts) -> bool {
        match self.entries.entry(id.into()) {
            btree_map::Entry::Occupied(_) => false,
            btree_map::Entry::Vacant(slot) => {
                slot.insert(facts);
                true
            }
        }
    }
}
