//! Relationship aggregation: merge, classify, resolve, bucket.

use serde::Serialize;
use std::collections::{HashMap, HashSet};

use crate::client::EntitySource;
use crate::error::Result;
use crate::model::{Entity, PropertyValue};
use crate::relations::classify::{classify, RelationCategory};
use crate::relations::extract::extract_nested_entities;
use crate::relations::resolve::resolve_many;
use crate::relations::CaptionCache;

/// Category buckets of counterpart display names - the enrichment result.
///
/// Each bucket holds unique display names in first-seen order. A name may
/// appear in more than one bucket when the counterpart holds distinct
/// relationship types simultaneously.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RelationshipSummary {
    pub director_of: Vec<String>,
    pub owner_of: Vec<String>,
    pub owned_by: Vec<String>,
    pub employee_of: Vec<String>,
    pub member_of: Vec<String>,
    pub family: Vec<String>,
    pub associates: Vec<String>,
    pub related: Vec<String>,
}

impl RelationshipSummary {
    fn bucket_mut(&mut self, category: RelationCategory) -> &mut Vec<String> {
        match category {
            RelationCategory::DirectorOf => &mut self.director_of,
            RelationCategory::OwnerOf => &mut self.owner_of,
            RelationCategory::OwnedBy => &mut self.owned_by,
            RelationCategory::EmployeeOf => &mut self.employee_of,
            RelationCategory::MemberOf => &mut self.member_of,
            RelationCategory::Family => &mut self.family,
            RelationCategory::Associate => &mut self.associates,
            RelationCategory::RelatedTo => &mut self.related,
        }
    }

    /// Append a display name unless the bucket already holds it
    /// (case-sensitive exact match).
    fn push_unique(&mut self, category: RelationCategory, display: String) {
        let bucket = self.bucket_mut(category);
        if !bucket.iter().any(|existing| *existing == display) {
            bucket.push(display);
        }
    }

    /// All buckets paired with their category, in fixed declaration order.
    pub fn sections(&self) -> [(RelationCategory, &[String]); 8] {
        [
            (RelationCategory::DirectorOf, self.director_of.as_slice()),
            (RelationCategory::OwnerOf, self.owner_of.as_slice()),
            (RelationCategory::OwnedBy, self.owned_by.as_slice()),
            (RelationCategory::EmployeeOf, self.employee_of.as_slice()),
            (RelationCategory::MemberOf, self.member_of.as_slice()),
            (RelationCategory::Family, self.family.as_slice()),
            (RelationCategory::Associate, self.associates.as_slice()),
            (RelationCategory::RelatedTo, self.related.as_slice()),
        ]
    }

    pub fn is_empty(&self) -> bool {
        self.sections().iter().all(|(_, names)| names.is_empty())
    }
}

/// A primary entity together with its resolved relationship buckets.
#[derive(Debug, Clone, Serialize)]
pub struct EnrichedEntity {
    pub entity: Entity,
    pub relationships: RelationshipSummary,
}

/// Fetch an entity and resolve its one-hop relationship graph into category
/// buckets.
///
/// The primary fetch is fatal on failure; the adjacency fetch is best-effort
/// and the two run concurrently. Relationship records from the adjacency
/// listing and records embedded inline in the primary entity are merged by
/// identifier (adjacency copy wins), classified relative to the anchor, and
/// counterpart captions are resolved in one concurrent batch before the
/// buckets are filled.
pub async fn fetch_with_relationships<S>(source: &S, id: &str) -> Result<EnrichedEntity>
where
    S: EntitySource + ?Sized,
{
    let (entity, adjacent) = tokio::join!(source.get_entity(id), source.get_adjacent(id));
    let entity = entity?;

    let nested = extract_nested_entities(&entity.properties);

    // Merge both sources by record identifier. Adjacency records go first,
    // so a duplicate identifier keeps the adjacency copy.
    let mut seen_ids = HashSet::new();
    let mut working = Vec::with_capacity(adjacent.len() + nested.len());
    for record in adjacent.into_iter().chain(nested) {
        if !record.id.is_empty() && seen_ids.insert(record.id.clone()) {
            working.push(record);
        }
    }
    log::debug!(
        "{}: {} candidate relationship records",
        entity.id,
        working.len()
    );

    // Seed the cache with every caption already visible, anchor included.
    let mut cache = CaptionCache::new();
    cache.insert_first(&entity.id, &entity.caption);
    for record in &working {
        cache.insert_first(&record.id, &record.caption);
        seed_embedded_captions(&record.properties, &mut cache);
    }

    // Classify, tracking which counterparts still need a caption.
    let mut edges = Vec::new();
    let mut unresolved = Vec::new();
    for record in &working {
        if let Some(edge) = classify(record, &entity.id, &mut cache) {
            if !cache.contains(&edge.counterpart_id) {
                unresolved.push(edge.counterpart_id.clone());
            }
            edges.push(edge);
        }
    }

    resolve_many(source, &unresolved, &mut cache).await;

    let mut relationships = RelationshipSummary::default();
    for edge in edges {
        relationships.push_unique(edge.category, cache.display(&edge.counterpart_id));
    }

    Ok(EnrichedEntity {
        entity,
        relationships,
    })
}

/// Record every embedded caption reachable in a property bag, at any nesting
/// depth.
fn seed_embedded_captions(
    properties: &HashMap<String, Vec<PropertyValue>>,
    cache: &mut CaptionCache,
) {
    for values in properties.values() {
        for value in values {
            if let PropertyValue::Entity(embedded) = value {
                if let Some(caption) = &embedded.caption {
                    cache.insert_first(&embedded.id, caption);
                }
                if let Some(inner) = &embedded.properties {
                    seed_embedded_captions(inner, cache);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::WatchlinkError;
    use crate::model::EmbeddedEntity;
    use async_trait::async_trait;

    /// In-memory entity source backed by fixed maps.
    struct StaticSource {
        entities: HashMap<String, Entity>,
        adjacent: HashMap<String, Vec<Entity>>,
    }

    impl StaticSource {
        fn new() -> Self {
            Self {
                entities: HashMap::new(),
                adjacent: HashMap::new(),
            }
        }

        fn with_entity(mut self, entity: Entity) -> Self {
            self.entities.insert(entity.id.clone(), entity);
            self
        }

        fn with_adjacent(mut self, id: &str, records: Vec<Entity>) -> Self {
            self.adjacent.insert(id.to_string(), records);
            self
        }
    }

    #[async_trait]
    impl EntitySource for StaticSource {
        async fn get_entity(&self, id: &str) -> Result<Entity> {
            self.entities
                .get(id)
                .cloned()
                .ok_or_else(|| WatchlinkError::NotFound(id.to_string()))
        }

        async fn get_adjacent(&self, id: &str) -> Vec<Entity> {
            // Degraded or absent adjacency reads as "no relationships".
            self.adjacent.get(id).cloned().unwrap_or_default()
        }
    }

    fn person(id: &str, caption: &str) -> Entity {
        Entity {
            id: id.to_string(),
            caption: caption.to_string(),
            schema: "Person".to_string(),
            properties: HashMap::new(),
            datasets: Vec::new(),
        }
    }

    fn relationship(id: &str, schema: &str, props: &[(&str, &[&str])]) -> Entity {
        let mut properties = HashMap::new();
        for (name, values) in props {
            properties.insert(
                name.to_string(),
                values
                    .iter()
                    .map(|v| PropertyValue::Text(v.to_string()))
                    .collect(),
            );
        }
        Entity {
            id: id.to_string(),
            caption: String::new(),
            schema: schema.to_string(),
            properties,
            datasets: Vec::new(),
        }
    }

    #[tokio::test]
    async fn test_owner_of_with_resolved_caption() {
        // Scenario: anchor owns an asset whose caption resolves upstream.
        let source = StaticSource::new()
            .with_entity(person("X", "Anchor Person"))
            .with_entity(person("Y", "Acme Corp"))
            .with_adjacent(
                "X",
                vec![relationship(
                    "own-1",
                    "Ownership",
                    &[("owner", &["X"]), ("asset", &["Y"])],
                )],
            );

        let enriched = fetch_with_relationships(&source, "X").await.unwrap();
        assert_eq!(enriched.relationships.owner_of, vec!["Acme Corp"]);
        assert!(enriched.relationships.owned_by.is_empty());
    }

    #[tokio::test]
    async fn test_owned_by_with_failed_resolution_falls_back_to_id() {
        // Scenario: counterpart fetch fails; display falls back to the raw id.
        let source = StaticSource::new()
            .with_entity(person("X", "Anchor Person"))
            .with_adjacent(
                "X",
                vec![relationship(
                    "own-1",
                    "Ownership",
                    &[("owner", &["Z"]), ("asset", &["X"])],
                )],
            );

        let enriched = fetch_with_relationships(&source, "X").await.unwrap();
        assert_eq!(enriched.relationships.owned_by, vec!["Z"]);
    }

    #[tokio::test]
    async fn test_self_referential_family_record_contributes_nothing() {
        let source = StaticSource::new()
            .with_entity(person("X", "Anchor Person"))
            .with_adjacent(
                "X",
                vec![relationship(
                    "fam-1",
                    "Family",
                    &[("person", &["X"]), ("relative", &["X"])],
                )],
            );

        let enriched = fetch_with_relationships(&source, "X").await.unwrap();
        assert!(enriched.relationships.is_empty());
    }

    #[tokio::test]
    async fn test_empty_adjacency_still_uses_embedded_records() {
        // Scenario: adjacency degraded to empty; a nested Ownership record
        // embedded in the primary entity still yields a bucket entry.
        let mut anchor = person("X", "Anchor Person");
        anchor.properties.insert(
            "ownershipOwner".to_string(),
            vec![PropertyValue::Entity(EmbeddedEntity {
                id: "own-9".to_string(),
                caption: None,
                schema: Some("Ownership".to_string()),
                properties: Some(HashMap::from([
                    (
                        "owner".to_string(),
                        vec![PropertyValue::Text("X".to_string())],
                    ),
                    (
                        "asset".to_string(),
                        vec![PropertyValue::Entity(EmbeddedEntity {
                            id: "acme".to_string(),
                            caption: Some("Acme Corp".to_string()),
                            schema: None,
                            properties: None,
                        })],
                    ),
                ])),
            })],
        );

        let source = StaticSource::new().with_entity(anchor);
        let enriched = fetch_with_relationships(&source, "X").await.unwrap();
        assert_eq!(enriched.relationships.owner_of, vec!["Acme Corp"]);
    }

    #[tokio::test]
    async fn test_no_relationships_at_all() {
        let source = StaticSource::new().with_entity(person("X", "Anchor Person"));
        let enriched = fetch_with_relationships(&source, "X").await.unwrap();
        assert!(enriched.relationships.is_empty());
        assert_eq!(enriched.entity.caption, "Anchor Person");
    }

    #[tokio::test]
    async fn test_duplicate_display_names_collapse_in_bucket() {
        // Two distinct Family records resolving to the same display name.
        let source = StaticSource::new()
            .with_entity(person("X", "Anchor Person"))
            .with_entity(person("rel-a", "John Doe"))
            .with_entity(person("rel-b", "John Doe"))
            .with_adjacent(
                "X",
                vec![
                    relationship(
                        "fam-1",
                        "Family",
                        &[("person", &["X"]), ("relative", &["rel-a"])],
                    ),
                    relationship(
                        "fam-2",
                        "Family",
                        &[("person", &["X"]), ("relative", &["rel-b"])],
                    ),
                ],
            );

        let enriched = fetch_with_relationships(&source, "X").await.unwrap();
        assert_eq!(enriched.relationships.family, vec!["John Doe"]);
    }

    #[tokio::test]
    async fn test_same_record_in_both_sources_classified_once() {
        // The same relationship id arrives via adjacency and embedded inline
        // with reversed roles; the adjacency copy wins and only one edge is
        // produced.
        let mut anchor = person("X", "Anchor Person");
        anchor.properties.insert(
            "ownershipAsset".to_string(),
            vec![PropertyValue::Entity(EmbeddedEntity {
                id: "own-1".to_string(),
                caption: None,
                schema: Some("Ownership".to_string()),
                properties: Some(HashMap::from([
                    (
                        "owner".to_string(),
                        vec![PropertyValue::Text("Y".to_string())],
                    ),
                    (
                        "asset".to_string(),
                        vec![PropertyValue::Text("X".to_string())],
                    ),
                ])),
            })],
        );

        let source = StaticSource::new()
            .with_entity(anchor)
            .with_entity(person("Y", "Acme Corp"))
            .with_adjacent(
                "X",
                vec![relationship(
                    "own-1",
                    "Ownership",
                    &[("owner", &["X"]), ("asset", &["Y"])],
                )],
            );

        let enriched = fetch_with_relationships(&source, "X").await.unwrap();
        assert_eq!(enriched.relationships.owner_of, vec!["Acme Corp"]);
        assert!(enriched.relationships.owned_by.is_empty());
    }

    #[tokio::test]
    async fn test_primary_fetch_failure_is_fatal() {
        let source = StaticSource::new();
        let err = fetch_with_relationships(&source, "missing")
            .await
            .unwrap_err();
        assert!(matches!(err, WatchlinkError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_embedded_caption_avoids_follow_up_fetch() {
        // The asset reference embeds its caption; no entity record for it
        // exists upstream, yet the display name resolves.
        let mut properties = HashMap::new();
        properties.insert(
            "owner".to_string(),
            vec![PropertyValue::Text("X".to_string())],
        );
        properties.insert(
            "asset".to_string(),
            vec![PropertyValue::Entity(EmbeddedEntity {
                id: "acme".to_string(),
                caption: Some("Acme Corp".to_string()),
                schema: None,
                properties: None,
            })],
        );
        let record = Entity {
            id: "own-1".to_string(),
            caption: String::new(),
            schema: "Ownership".to_string(),
            properties,
            datasets: Vec::new(),
        };

        let source = StaticSource::new()
            .with_entity(person("X", "Anchor Person"))
            .with_adjacent("X", vec![record]);

        let enriched = fetch_with_relationships(&source, "X").await.unwrap();
        assert_eq!(enriched.relationships.owner_of, vec!["Acme Corp"]);
    }

    #[tokio::test]
    async fn test_multiple_categories_for_one_counterpart() {
        // The same counterpart holds two distinct relationship types and
        // appears in both buckets.
        let source = StaticSource::new()
            .with_entity(person("X", "Anchor Person"))
            .with_entity(person("org", "Globex Ltd"))
            .with_adjacent(
                "X",
                vec![
                    relationship(
                        "dir-1",
                        "Directorship",
                        &[("director", &["X"]), ("organization", &["org"])],
                    ),
                    relationship(
                        "own-1",
                        "Ownership",
                        &[("owner", &["X"]), ("asset", &["org"])],
                    ),
                ],
            );

        let enriched = fetch_with_relationships(&source, "X").await.unwrap();
        assert_eq!(enriched.relationships.director_of, vec!["Globex Ltd"]);
        assert_eq!(enriched.relationships.owner_of, vec!["Globex Ltd"]);
    }

    #[tokio::test]
    async fn test_record_not_involving_anchor_is_skipped() {
        let source = StaticSource::new()
            .with_entity(person("X", "Anchor Person"))
            .with_adjacent(
                "X",
                vec![relationship(
                    "own-1",
                    "Ownership",
                    &[("owner", &["A"]), ("asset", &["B"])],
                )],
            );

        let enriched = fetch_with_relationships(&source, "X").await.unwrap();
        assert!(enriched.relationships.is_empty());
    }

    #[test]
    fn test_push_unique_is_case_sensitive() {
        let mut summary = RelationshipSummary::default();
        summary.push_unique(RelationCategory::Family, "John Doe".to_string());
        summary.push_unique(RelationCategory::Family, "John Doe".to_string());
        summary.push_unique(RelationCategory::Family, "JOHN DOE".to_string());
        assert_eq!(summary.family, vec!["John Doe", "JOHN DOE"]);
    }
}
