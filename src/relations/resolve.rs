//! Caption resolution for counterpart identifiers.

use futures_util::future::join_all;
use std::collections::HashSet;

use crate::client::EntitySource;
use crate::relations::CaptionCache;

/// Resolve captions for every identifier not already cached.
///
/// Follow-up fetches for distinct identifiers run concurrently and each
/// identifier is attempted at most once. Individual failures are logged and
/// skipped, leaving the identifier uncached so downstream display falls back
/// to the raw identifier. Records without a caption are skipped the same way.
pub async fn resolve_many<S>(source: &S, ids: &[String], cache: &mut CaptionCache)
where
    S: EntitySource + ?Sized,
{
    let mut seen = HashSet::new();
    let pending: Vec<&str> = ids
        .iter()
        .map(String::as_str)
        .filter(|id| !id.is_empty() && !cache.contains(id) && seen.insert(*id))
        .collect();

    if pending.is_empty() {
        return;
    }
    log::debug!("Resolving {} uncached captions", pending.len());

    let fetches = pending.into_iter().map(|id| async move {
        match source.get_entity(id).await {
            Ok(entity) => Some((id.to_string(), entity.caption)),
            Err(e) => {
                log::debug!("Caption resolution failed for {}: {}", id, e);
                None
            }
        }
    });

    for (id, caption) in join_all(fetches).await.into_iter().flatten() {
        cache.insert_first(&id, &caption);
    }
}
