//! Merging AUR search hits into an existing catalog.

use std::collections::HashSet;

use crate::state::{PackageRecord, SourceKind};

use super::Catalog;

/// What: Fold fresh AUR search hits into the catalog.
///
/// Inputs:
/// - `catalog`: Catalog to patch in place
/// - `hits`: Hit names for the current term, adapter-deduplicated
///
/// Output:
/// - Stale uninstalled AUR rows removed, new hits appended
///
/// Details:
/// - Uninstalled AUR records are leftovers of a previous term's search and
///   are dropped first so search noise never accumulates across terms.
/// - A hit whose name already exists under any source is skipped, so a name
///   matching an installed AUR record keeps exactly one row with
///   `installed = true` intact.
pub fn merge_aur_hits(catalog: &mut Catalog, hits: &[String]) {
    catalog
        .records_mut()
        .retain(|r| r.source_kind != SourceKind::Aur || r.installed);

    let present: HashSet<&str> = catalog.records().iter().map(|r| r.name.as_str()).collect();
    let fresh: Vec<PackageRecord> = hits
        .iter()
        .filter(|name| !present.contains(name.as_str()))
        .map(|name| PackageRecord::aur(name.clone(), false))
        .collect();
    tracing::debug!(
        hits = hits.len(),
        appended = fresh.len(),
        "AUR search hits merged"
    );
    catalog.records_mut().extend(fresh);
}
