pub mod client;
pub mod config;
pub mod error;
pub mod model;
pub mod notes;
pub mod relations;

pub use client::{ApiClient, EntitySource, SearchParams};
pub use config::Config;
pub use error::{Result, WatchlinkError};
pub use model::{Entity, PropertyValue};
pub use relations::{fetch_with_relationships, CaptionCache, EnrichedEntity, RelationshipSummary};
