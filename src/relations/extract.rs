//! Reference extraction from property bags.
//!
//! The single place where the bare-string / embedded-reference union is
//! collapsed to plain identifiers. Extraction never fails: malformed or
//! partial values are treated as absent.

use std::collections::HashMap;

use crate::model::{EmbeddedEntity, Entity, PropertyValue};
use crate::relations::CaptionCache;

/// Identifier carried by a property value: the string itself for bare
/// values, the embedded id for reference objects. Empty strings count as
/// absent.
pub fn extract_entity_id(value: &PropertyValue) -> Option<&str> {
    match value {
        PropertyValue::Text(s) if !s.is_empty() => Some(s),
        PropertyValue::Entity(e) if !e.id.is_empty() => Some(&e.id),
        _ => None,
    }
}

/// First resolvable identifier in a value list.
///
/// Side effect: every embedded caption seen in the list is recorded into the
/// cache, so a later display lookup can avoid a follow-up fetch.
pub fn extract_first_target(values: &[PropertyValue], cache: &mut CaptionCache) -> Option<String> {
    let mut first = None;
    for value in values {
        if let PropertyValue::Entity(embedded) = value {
            if let Some(caption) = &embedded.caption {
                cache.insert_first(&embedded.id, caption);
            }
        }
        if first.is_none() {
            first = extract_entity_id(value).map(str::to_string);
        }
    }
    first
}

/// Collect every embedded reference in a property bag that looks like a full
/// record (has both an identifier and a schema tag).
///
/// Recovers relationship records the API embedded inline in the primary
/// entity instead of exposing via the adjacency endpoint.
pub fn extract_nested_entities(properties: &HashMap<String, Vec<PropertyValue>>) -> Vec<Entity> {
    let mut nested = Vec::new();
    for values in properties.values() {
        for value in values {
            if let PropertyValue::Entity(embedded) = value {
                if let Some(entity) = materialize(embedded) {
                    nested.push(entity);
                }
            }
        }
    }
    nested
}

/// Promote an embedded reference to a standalone record, if it carries enough
/// to be one.
fn materialize(embedded: &EmbeddedEntity) -> Option<Entity> {
    if embedded.id.is_empty() {
        return None;
    }
    let schema = embedded.schema.as_deref().filter(|s| !s.is_empty())?;
    Some(Entity {
        id: embedded.id.clone(),
        caption: embedded.caption.clone().unwrap_or_default(),
        schema: schema.to_string(),
        properties: embedded.properties.clone().unwrap_or_default(),
        datasets: Vec::new(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> PropertyValue {
        PropertyValue::Text(s.to_string())
    }

    fn embedded(id: &str, caption: Option<&str>, schema: Option<&str>) -> PropertyValue {
        PropertyValue::Entity(EmbeddedEntity {
            id: id.to_string(),
            caption: caption.map(str::to_string),
            schema: schema.map(str::to_string),
            properties: None,
        })
    }

    #[test]
    fn test_extract_id_from_bare_string() {
        assert_eq!(extract_entity_id(&text("Q7747")), Some("Q7747"));
        assert_eq!(extract_entity_id(&text("")), None);
    }

    #[test]
    fn test_extract_id_from_embedded() {
        assert_eq!(
            extract_entity_id(&embedded("acme", Some("Acme Corp"), None)),
            Some("acme")
        );
        assert_eq!(extract_entity_id(&embedded("", Some("No Id"), None)), None);
    }

    #[test]
    fn test_first_target_prefers_first_resolvable() {
        let mut cache = CaptionCache::new();
        let values = vec![text(""), text("Q7747"), text("other")];
        assert_eq!(
            extract_first_target(&values, &mut cache),
            Some("Q7747".to_string())
        );
    }

    #[test]
    fn test_first_target_records_embedded_captions() {
        let mut cache = CaptionCache::new();
        let values = vec![
            embedded("acme", Some("Acme Corp"), None),
            embedded("globex", Some("Globex Ltd"), None),
        ];
        let target = extract_first_target(&values, &mut cache);
        assert_eq!(target, Some("acme".to_string()));
        // Captions beyond the first target are recorded too.
        assert_eq!(cache.get("acme"), Some("Acme Corp"));
        assert_eq!(cache.get("globex"), Some("Globex Ltd"));
    }

    #[test]
    fn test_first_target_empty_list() {
        let mut cache = CaptionCache::new();
        assert_eq!(extract_first_target(&[], &mut cache), None);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_nested_entities_require_id_and_schema() {
        let mut properties = HashMap::new();
        properties.insert(
            "ownershipOwner".to_string(),
            vec![
                // Full record: kept.
                PropertyValue::Entity(EmbeddedEntity {
                    id: "own-1".to_string(),
                    caption: None,
                    schema: Some("Ownership".to_string()),
                    properties: Some(HashMap::from([(
                        "owner".to_string(),
                        vec![text("Q7747")],
                    )])),
                }),
                // Reference without schema: skipped.
                embedded("acme", Some("Acme Corp"), None),
                // Bare string: skipped.
                text("Q7747"),
            ],
        );

        let nested = extract_nested_entities(&properties);
        assert_eq!(nested.len(), 1);
        assert_eq!(nested[0].id, "own-1");
        assert_eq!(nested[0].schema, "Ownership");
        assert_eq!(nested[0].values("owner").len(), 1);
    }

    #[test]
    fn test_nested_entities_empty_bag() {
        assert!(extract_nested_entities(&HashMap::new()).is_empty());
    }
}
