//! In-memory package catalog assembled from all sources.
//!
//! The catalog is rebuilt wholesale by [`full_load`], merged with AUR search
//! hits by [`merge::merge_aur_hits`], or patched in place by
//! [`reconcile::apply`]. It lives for the session and is owned by the control
//! task; a new load simply replaces it.

use crate::sources::{AurSource, FlatpakSource, RepoSource, aur, flatpak, repo};
use crate::state::PackageRecord;

/// AUR search-hit merge policy.
pub mod merge;
/// Installed-state reconciliation.
pub mod reconcile;

pub use reconcile::InstalledSets;

/// Insertion-ordered collection of records from all sources.
///
/// No cross-source uniqueness is enforced: a name may legitimately appear
/// once per source. Within a source the adapters emit each name once.
#[derive(Clone, Debug, Default)]
pub struct Catalog {
    records: Vec<PackageRecord>,
}

impl Catalog {
    /// An empty catalog.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            records: Vec::new(),
        }
    }

    /// Wrap an already-normalized record list.
    #[must_use]
    pub fn from_records(records: Vec<PackageRecord>) -> Self {
        Self { records }
    }

    /// All records in insertion order.
    #[must_use]
    pub fn records(&self) -> &[PackageRecord] {
        &self.records
    }

    /// Mutable access for in-place patches (reconciliation, merges).
    pub(crate) fn records_mut(&mut self) -> &mut Vec<PackageRecord> {
        &mut self.records
    }

    /// Number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the catalog holds no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Whether any record under any source carries `name`.
    #[must_use]
    pub fn contains_name(&self, name: &str) -> bool {
        self.records.iter().any(|r| r.name == name)
    }

    /// First record carrying `name`, searched in insertion order, so repo
    /// entries win over AUR entries for ambiguous operation targets.
    #[must_use]
    pub fn find_by_name(&self, name: &str) -> Option<&PackageRecord> {
        self.records.iter().find(|r| r.name == name)
    }
}

/// What: Rebuild the whole catalog from every enabled source.
///
/// Inputs:
/// - `repo_src`, `flatpak_src`, `aur_src`: Listing capabilities
/// - `aur_enabled`: User setting gating the AUR source
///
/// Output:
/// - A fresh catalog: repo records, then flathub records, then installed AUR
///   records; sources that are unavailable or failing contribute nothing
///
/// Details:
/// - Infallible by construction: every adapter degrades to empty.
#[must_use]
pub fn full_load(
    repo_src: &dyn RepoSource,
    flatpak_src: &dyn FlatpakSource,
    aur_src: &dyn AurSource,
    aur_enabled: bool,
) -> Catalog {
    let mut records = repo::repo_records(repo_src);
    records.extend(flatpak::flatpak_records(flatpak_src));
    if aur_enabled {
        records.extend(aur::aur_installed_records(aur_src));
    } else {
        tracing::debug!("AUR source disabled by setting; skipping");
    }
    tracing::info!(total = records.len(), "catalog loaded");
    Catalog::from_records(records)
}

#[cfg(test)]
mod tests {
    use super::Catalog;
    use crate::state::PackageRecord;

    #[test]
    /// What: Name lookups span sources and prefer insertion order
    ///
    /// - Input: The same name as a pacman and an AUR record
    /// - Output: contains_name true; find_by_name returns the pacman entry
    fn catalog_name_lookup_prefers_insertion_order() {
        let cat = Catalog::from_records(vec![
            PackageRecord::pacman("firefox", "extra", true),
            PackageRecord::aur("firefox", false),
        ]);
        assert_eq!(cat.len(), 2);
        assert!(cat.contains_name("firefox"));
        assert!(!cat.contains_name("chromium"));
        let hit = cat.find_by_name("firefox").map(|r| r.source_kind);
        assert_eq!(hit, Some(crate::state::SourceKind::Pacman));
    }
}
