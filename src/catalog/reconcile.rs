//! Incremental installed-state reconciliation.
//!
//! After any install/remove/update operation completes — successfully or not,
//! since partial failures leave state changed — the cheap "what is installed"
//! queries are re-run and every record's `installed` flag is recomputed by
//! set membership. The expensive available-package listings are not touched.

use std::collections::HashSet;

use crate::sources::{AurSource, FlatpakSource, RepoSource, SourceError};
use crate::state::SourceKind;

use super::Catalog;

/// The three installed sets that are cheap to re-derive.
#[derive(Clone, Debug, Default)]
pub struct InstalledSets {
    /// Locally installed official packages, by name.
    pub pacman: HashSet<String>,
    /// Installed flatpak applications, by application id.
    pub flatpak: HashSet<String>,
    /// Installed AUR (foreign) packages, by name.
    pub aur: HashSet<String>,
}

/// What: Re-derive the installed sets from the live system.
///
/// Inputs:
/// - `repo_src`, `flatpak_src`, `aur_src`: Listing capabilities
///
/// Output:
/// - Fresh sets on success; the first query failure otherwise, signalling
///   the caller to fall back to a full catalog reload
///
/// # Errors
/// - Propagates the underlying [`SourceError`] of any failing query.
///
/// Details:
/// - A missing flatpak installation is a stable condition, not a query
///   failure: its set is simply empty.
pub fn gather(
    repo_src: &dyn RepoSource,
    flatpak_src: &dyn FlatpakSource,
    aur_src: &dyn AurSource,
) -> Result<InstalledSets, SourceError> {
    let pacman = repo_src.installed_names()?;
    let flatpak = if flatpak_src.is_available() {
        flatpak_src.installed_ids()?
    } else {
        HashSet::new()
    };
    let aur = aur_src.installed_names()?;
    Ok(InstalledSets {
        pacman,
        flatpak,
        aur,
    })
}

/// What: Patch every record's `installed` flag from the given sets.
///
/// Inputs:
/// - `catalog`: Catalog to patch in place
/// - `sets`: Freshly gathered installed sets
///
/// Output:
/// - Number of records whose flag changed
///
/// Details:
/// - Flatpak records match on their install key (the application id); all
///   other records match on `name`. Records are never added or removed.
pub fn apply(catalog: &mut Catalog, sets: &InstalledSets) -> usize {
    let mut changed = 0;
    for rec in catalog.records_mut() {
        let now_installed = match rec.source_kind {
            SourceKind::Pacman => sets.pacman.contains(&rec.name),
            SourceKind::Flatpak => sets.flatpak.contains(rec.install_target()),
            SourceKind::Aur => sets.aur.contains(&rec.name),
        };
        if rec.installed != now_installed {
            rec.installed = now_installed;
            changed += 1;
        }
    }
    if changed > 0 {
        tracing::info!(changed, "installed state reconciled");
    }
    changed
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::{InstalledSets, apply};
    use crate::catalog::Catalog;
    use crate::state::PackageRecord;

    fn sets(
        pacman: &[&str],
        flatpak: &[&str],
        aur: &[&str],
    ) -> InstalledSets {
        let to_set = |xs: &[&str]| -> HashSet<String> {
            xs.iter().map(|s| (*s).to_string()).collect()
        };
        InstalledSets {
            pacman: to_set(pacman),
            flatpak: to_set(flatpak),
            aur: to_set(aur),
        }
    }

    #[test]
    /// What: Flags flip per source kind, flatpak keyed on the application id
    ///
    /// - Input: GIMP flatpak record named "GIMP" with id org.gimp.GIMP;
    ///   installed set contains the id only
    /// - Output: Record becomes installed; pacman/AUR flags follow their sets
    fn reconcile_matches_flatpak_on_install_key() {
        let mut cat = Catalog::from_records(vec![
            PackageRecord::pacman("vim", "extra", true),
            PackageRecord::flatpak("GIMP", "org.gimp.GIMP", false),
            PackageRecord::aur("paru-bin", false),
        ]);
        let changed = apply(
            &mut cat,
            &sets(&[], &["org.gimp.GIMP"], &["paru-bin"]),
        );
        assert_eq!(changed, 3);
        let recs = cat.records();
        assert!(!recs[0].installed);
        assert!(recs[1].installed);
        assert!(recs[2].installed);
    }

    #[test]
    /// What: Unchanged sets leave every flag untouched
    ///
    /// - Input: Catalog whose flags already agree with the sets
    /// - Output: Zero changes on a repeat pass
    fn reconcile_is_stable_without_changes() {
        let mut cat = Catalog::from_records(vec![
            PackageRecord::pacman("vim", "extra", true),
            PackageRecord::flatpak("GIMP", "org.gimp.GIMP", true),
            PackageRecord::aur("paru-bin", false),
        ]);
        let s = sets(&["vim"], &["org.gimp.GIMP"], &[]);
        assert_eq!(apply(&mut cat, &s), 0);
        assert_eq!(apply(&mut cat, &s), 0);
        assert!(cat.records()[0].installed);
        assert!(cat.records()[1].installed);
        assert!(!cat.records()[2].installed);
    }
}
