//! Markdown note rendering with YAML frontmatter.

use chrono::Utc;
use serde::Serialize;
use std::collections::HashMap;

use crate::config::NotesConfig;
use crate::model::PropertyValue;
use crate::notes::sanitize_filename;
use crate::relations::EnrichedEntity;

/// Rendering options, usually derived from the `[notes]` config section.
#[derive(Debug, Clone)]
pub struct NoteOptions {
    /// Render counterpart names as [[wikilinks]] instead of plain text.
    pub wikilinks: bool,
    /// Per-schema property names for the note body; schemas absent from the
    /// map fall back to `DEFAULT_FIELDS`.
    pub fields: HashMap<String, Vec<String>>,
}

impl From<&NotesConfig> for NoteOptions {
    fn from(config: &NotesConfig) -> Self {
        Self {
            wikilinks: config.wikilinks,
            fields: config.fields.clone(),
        }
    }
}

/// Property fields rendered for schemas with no configured list.
const DEFAULT_FIELDS: &[&str] = &["birthDate", "country", "topics", "alias"];

#[derive(Serialize)]
struct NoteFrontmatter<'a> {
    id: &'a str,
    schema: &'a str,
    datasets: &'a [String],
    retrieved: String,
}

/// Render an enriched entity as (filename, Markdown content).
///
/// The filename is the sanitized caption (identifier when the caption is
/// empty) with an `.md` extension. The body carries YAML frontmatter, a
/// property section per the configured field list, and one section per
/// non-empty category bucket.
pub fn render_note(enriched: &EnrichedEntity, options: &NoteOptions) -> (String, String) {
    let entity = &enriched.entity;
    let display: &str = if entity.caption.is_empty() {
        &entity.id
    } else {
        &entity.caption
    };
    let filename = format!("{}.md", sanitize_filename(display));

    let frontmatter = NoteFrontmatter {
        id: &entity.id,
        schema: &entity.schema,
        datasets: &entity.datasets,
        retrieved: Utc::now().to_rfc3339(),
    };
    let yaml = serde_yaml_ng::to_string(&frontmatter).unwrap_or_default();

    let mut body = String::new();
    body.push_str("---\n");
    body.push_str(&yaml);
    body.push_str("---\n\n");
    body.push_str(&format!("# {}\n\n", display));

    let configured = options.fields.get(&entity.schema);
    let fields: Vec<&str> = match configured {
        Some(list) => list.iter().map(String::as_str).collect(),
        None => DEFAULT_FIELDS.to_vec(),
    };
    let mut wrote_fields = false;
    for field in fields {
        let values = entity.values(field);
        if values.is_empty() {
            continue;
        }
        let joined = values
            .iter()
            .filter_map(property_text)
            .collect::<Vec<_>>()
            .join(", ");
        if joined.is_empty() {
            continue;
        }
        body.push_str(&format!("- **{}**: {}\n", field, joined));
        wrote_fields = true;
    }
    if wrote_fields {
        body.push('\n');
    }

    for (category, names) in enriched.relationships.sections() {
        if names.is_empty() {
            continue;
        }
        body.push_str(&format!("## {}\n\n", category.label()));
        for name in names {
            if options.wikilinks {
                body.push_str(&format!("- [[{}]]\n", name));
            } else {
                body.push_str(&format!("- {}\n", name));
            }
        }
        body.push('\n');
    }

    (filename, body)
}

/// Display text for a property value: the string itself, or the embedded
/// caption (falling back to the embedded id).
fn property_text(value: &PropertyValue) -> Option<String> {
    match value {
        PropertyValue::Text(s) if !s.is_empty() => Some(s.clone()),
        PropertyValue::Entity(e) => match &e.caption {
            Some(caption) if !caption.is_empty() => Some(caption.clone()),
            _ if !e.id.is_empty() => Some(e.id.clone()),
            _ => None,
        },
        _ => None,
    }
}
