//! Relationship resolution: extraction, classification, caption resolution,
//! and aggregation into category buckets.
//!
//! The upstream API returns relationship data in three shapes: a dedicated
//! adjacency endpoint grouped by property name, relationship records embedded
//! inline in the primary entity's properties, and bare identifier strings
//! requiring a follow-up fetch. These modules reconcile all three.

pub mod aggregate;
pub mod classify;
pub mod extract;
pub mod resolve;

pub use aggregate::{fetch_with_relationships, EnrichedEntity, RelationshipSummary};
pub use classify::{classify, ClassifiedEdge, RelationCategory};
pub use extract::{extract_entity_id, extract_first_target, extract_nested_entities};
pub use resolve::resolve_many;

use std::collections::HashMap;

/// Per-call cache mapping entity identifier -> display caption.
///
/// First writer wins: once an identifier is mapped its caption is never
/// overwritten within the same enrichment call, so conflicting embedded
/// captions for the same identifier cannot flip the result mid-operation.
/// Threaded explicitly through the aggregation steps; not shared across calls.
#[derive(Debug, Default)]
pub struct CaptionCache {
    entries: HashMap<String, String>,
}

impl CaptionCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a caption unless the identifier is already mapped or the
    /// caption is empty.
    pub fn insert_first(&mut self, id: &str, caption: &str) {
        if id.is_empty() || caption.is_empty() {
            return;
        }
        self.entries
            .entry(id.to_string())
            .or_insert_with(|| caption.to_string());
    }

    pub fn get(&self, id: &str) -> Option<&str> {
        self.entries.get(id).map(String::as_str)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    /// Display name for an identifier: the cached caption, or the raw
    /// identifier if resolution never succeeded.
    pub fn display(&self, id: &str) -> String {
        self.get(id).unwrap_or(id).to_string()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
