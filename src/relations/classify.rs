//! Relationship classification.
//!
//! Each relationship schema defines exactly two role properties; which of
//! them contains the anchor identifier determines the direction of the edge.
//! Dispatch is a fixed rule table: new relationship types are new rows, not
//! new code paths.

use crate::model::{Entity, PropertyValue};
use crate::relations::extract::{extract_entity_id, extract_first_target};
use crate::relations::CaptionCache;

/// Directional relationship categories, one per bucket in the enrichment
/// result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RelationCategory {
    DirectorOf,
    OwnerOf,
    OwnedBy,
    EmployeeOf,
    MemberOf,
    Family,
    Associate,
    RelatedTo,
}

impl RelationCategory {
    /// Human-readable bucket heading.
    pub fn label(&self) -> &'static str {
        match self {
            RelationCategory::DirectorOf => "Director of",
            RelationCategory::OwnerOf => "Owner of",
            RelationCategory::OwnedBy => "Owned by",
            RelationCategory::EmployeeOf => "Employee of",
            RelationCategory::MemberOf => "Member of",
            RelationCategory::Family => "Family",
            RelationCategory::Associate => "Associate / co-conspirator",
            RelationCategory::RelatedTo => "Related to",
        }
    }
}

/// One row of the classification table: a relationship schema, its two role
/// properties, and the category assigned when the anchor sits in each role.
/// A `None` category marks a one-directional type (no edge is produced when
/// the anchor holds that role).
struct RelationRule {
    schema: &'static str,
    role_a: &'static str,
    role_b: &'static str,
    category_a: Option<RelationCategory>,
    category_b: Option<RelationCategory>,
}

const RELATION_RULES: &[RelationRule] = &[
    RelationRule {
        schema: "Directorship",
        role_a: "director",
        role_b: "organization",
        category_a: Some(RelationCategory::DirectorOf),
        category_b: None,
    },
    RelationRule {
        schema: "Ownership",
        role_a: "owner",
        role_b: "asset",
        category_a: Some(RelationCategory::OwnerOf),
        category_b: Some(RelationCategory::OwnedBy),
    },
    RelationRule {
        schema: "Employment",
        role_a: "employee",
        role_b: "employer",
        category_a: Some(RelationCategory::EmployeeOf),
        category_b: None,
    },
    RelationRule {
        schema: "Membership",
        role_a: "member",
        role_b: "organization",
        category_a: Some(RelationCategory::MemberOf),
        category_b: None,
    },
    RelationRule {
        schema: "Family",
        role_a: "person",
        role_b: "relative",
        category_a: Some(RelationCategory::Family),
        category_b: Some(RelationCategory::Family),
    },
    RelationRule {
        schema: "Associate",
        role_a: "person",
        role_b: "associate",
        category_a: Some(RelationCategory::Associate),
        category_b: Some(RelationCategory::Associate),
    },
    RelationRule {
        schema: "Succession",
        role_a: "subject",
        role_b: "object",
        category_a: Some(RelationCategory::RelatedTo),
        category_b: Some(RelationCategory::RelatedTo),
    },
    RelationRule {
        schema: "UnknownLink",
        role_a: "subject",
        role_b: "object",
        category_a: Some(RelationCategory::RelatedTo),
        category_b: Some(RelationCategory::RelatedTo),
    },
    RelationRule {
        schema: "Representation",
        role_a: "subject",
        role_b: "object",
        category_a: Some(RelationCategory::RelatedTo),
        category_b: Some(RelationCategory::RelatedTo),
    },
];

/// A classified, directional edge relative to an anchor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifiedEdge {
    pub category: RelationCategory,
    pub counterpart_id: String,
}

/// Classify a relationship record relative to an anchor entity.
///
/// Returns `None` for unrecognized schemas, records that never mention the
/// anchor (the adjacency endpoint does return those; they are skipped, not
/// errors), one-directional types where the anchor holds the reverse role,
/// and self-loops. Embedded captions seen while extracting the counterpart
/// are recorded into the cache.
pub fn classify(
    record: &Entity,
    anchor_id: &str,
    cache: &mut CaptionCache,
) -> Option<ClassifiedEdge> {
    let rule = RELATION_RULES.iter().find(|r| r.schema == record.schema)?;

    // Role A membership is checked first; role B only if the anchor is
    // absent from role A's value list.
    let (category, counterpart_role) = if contains_id(record.values(rule.role_a), anchor_id) {
        (rule.category_a, rule.role_b)
    } else if contains_id(record.values(rule.role_b), anchor_id) {
        (rule.category_b, rule.role_a)
    } else {
        return None;
    };

    let category = category?;
    let counterpart_id = extract_first_target(record.values(counterpart_role), cache)?;
    if counterpart_id == anchor_id {
        // Self-loop guard.
        return None;
    }

    Some(ClassifiedEdge {
        category,
        counterpart_id,
    })
}

fn contains_id(values: &[PropertyValue], id: &str) -> bool {
    values.iter().any(|v| extract_entity_id(v) == Some(id))
}
