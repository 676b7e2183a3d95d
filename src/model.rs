//! Wire-level data model for the screening API.
//!
//! Entities are immutable snapshots as returned by the API. Property values
//! come in two shapes: bare identifier/text strings, or embedded reference
//! objects carrying their own id and optionally a caption, schema, and
//! nested properties.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// One value in an entity's property bag.
///
/// Deserialized untagged: JSON strings become `Text`, JSON objects become
/// `Entity` (an embedded reference).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
    /// A bare string: either literal property text or an entity identifier.
    Text(String),
    /// An embedded reference object.
    Entity(EmbeddedEntity),
}

/// An embedded entity reference inside a property value.
///
/// Every field is optional on the wire; a reference without an id is kept
/// parseable and treated as absent by the extractor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddedEntity {
    #[serde(default)]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<HashMap<String, Vec<PropertyValue>>>,
}

/// An entity record (or relationship record - relationships are entities
/// whose schema names a relationship type, e.g. "Ownership").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entity {
    /// Globally unique, stable identifier.
    pub id: String,
    /// Display caption; may be empty.
    #[serde(default)]
    pub caption: String,
    /// Schema tag, e.g. "Person", "Company", "Ownership".
    pub schema: String,
    /// Property name -> ordered values.
    #[serde(default)]
    pub properties: HashMap<String, Vec<PropertyValue>>,
    /// Source dataset tags.
    #[serde(default)]
    pub datasets: Vec<String>,
}

impl Entity {
    /// Values under a property name, or an empty slice if the property is absent.
    pub fn values(&self, property: &str) -> &[PropertyValue] {
        self.properties
            .get(property)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

/// Result-count header on a search response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchTotal {
    pub value: u64,
    /// "eq" when exact, "gte" when the count is a lower bound.
    #[serde(default)]
    pub relation: String,
}

/// Response body of `GET /search/{scope}`.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchResponse {
    pub total: SearchTotal,
    #[serde(default)]
    pub limit: u32,
    #[serde(default)]
    pub offset: u32,
    #[serde(default)]
    pub results: Vec<Entity>,
    #[serde(default)]
    pub facets: Option<Value>,
}

/// Primary response shape of `GET /entities/{id}/adjacent`: relationship
/// records grouped by the property name under which they hang off the entity.
#[derive(Debug, Clone, Deserialize)]
pub struct AdjacentResponse {
    pub entity: Entity,
    #[serde(default)]
    pub adjacent: HashMap<String, AdjacentGroup>,
}

/// One property-name group in an adjacency response.
#[derive(Debug, Clone, Deserialize)]
pub struct AdjacentGroup {
    #[serde(default)]
    pub results: Vec<Entity>,
}

/// Fallback adjacency shape: a flat `{"results": [...]}` wrapper.
#[derive(Debug, Clone, Deserialize)]
pub struct ResultsWrapper {
    #[serde(default)]
    pub results: Vec<Entity>,
}
