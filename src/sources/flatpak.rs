//! Flatpak adapter gated on tool availability and the flathub remote.

use std::collections::HashSet;

use crate::state::PackageRecord;

use super::{FlatpakSource, SourceError, run_tool};

/// Flatpak adapter that shells out to the system flatpak binary.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemFlatpak;

impl FlatpakSource for SystemFlatpak {
    fn is_available(&self) -> bool {
        which::which("flatpak").is_ok()
    }

    fn flathub_enabled(&self) -> Result<bool, SourceError> {
        let body = run_tool("flatpak", &["remotes", "--columns=name"])?;
        Ok(body
            .lines()
            .any(|l| l.trim().eq_ignore_ascii_case("flathub")))
    }

    fn remote_apps(&self) -> Result<Vec<(String, String)>, SourceError> {
        // Tab-separated `name<TAB>application-id` rows.
        let body = run_tool(
            "flatpak",
            &["remote-ls", "flathub", "--app", "--columns=name,application"],
        )?;
        let mut out = Vec::new();
        for line in body.lines() {
            if let Some((name, app_id)) = line.split_once('\t') {
                let (name, app_id) = (name.trim(), app_id.trim());
                if !name.is_empty() && !app_id.is_empty() {
                    out.push((name.to_string(), app_id.to_string()));
                }
            }
        }
        Ok(out)
    }

    fn installed_ids(&self) -> Result<HashSet<String>, SourceError> {
        let body = run_tool("flatpak", &["list", "--app", "--columns=application"])?;
        Ok(body
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(ToString::to_string)
            .collect())
    }
}

/// What: Produce normalized records for flathub applications.
///
/// Inputs:
/// - `src`: Flatpak listing capability
///
/// Output:
/// - One record per distinct application id with `installed` set by
///   membership in the installed-id set; empty when flatpak is missing, the
///   flathub remote is disabled, or any listing fails
///
/// Details:
/// - The availability and remote checks gate the (slow, networked) remote
///   listing; both are treated as ordinary "no records" conditions.
#[must_use]
pub fn flatpak_records(src: &dyn FlatpakSource) -> Vec<PackageRecord> {
    if !src.is_available() {
        tracing::debug!("flatpak not on PATH; skipping source");
        return Vec::new();
    }
    match src.flathub_enabled() {
        Ok(true) => {}
        Ok(false) => {
            tracing::debug!("flathub remote not configured; skipping source");
            return Vec::new();
        }
        Err(e) => {
            tracing::warn!(class = e.class(), error = %e, "flatpak remote check degraded to empty");
            return Vec::new();
        }
    }
    let installed = match src.installed_ids() {
        Ok(set) => set,
        Err(e) => {
            tracing::warn!(class = e.class(), error = %e, "flatpak installed listing degraded to empty");
            return Vec::new();
        }
    };
    let apps = match src.remote_apps() {
        Ok(list) => list,
        Err(e) => {
            tracing::warn!(class = e.class(), error = %e, "flatpak remote listing degraded to empty");
            return Vec::new();
        }
    };
    let mut seen = HashSet::new();
    let mut records = Vec::with_capacity(apps.len());
    for (name, app_id) in apps {
        if !seen.insert(app_id.clone()) {
            continue;
        }
        let is_installed = installed.contains(&app_id);
        records.push(PackageRecord::flatpak(name, app_id, is_installed));
    }
    records
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::{FlatpakSource, SourceError, flatpak_records};

    struct FakeFlatpak {
        available: bool,
        flathub: bool,
        apps: Vec<(&'static str, &'static str)>,
        installed: Vec<&'static str>,
    }

    impl FlatpakSource for FakeFlatpak {
        fn is_available(&self) -> bool {
            self.available
        }
        fn flathub_enabled(&self) -> Result<bool, SourceError> {
            Ok(self.flathub)
        }
        fn remote_apps(&self) -> Result<Vec<(String, String)>, SourceError> {
            Ok(self
                .apps
                .iter()
                .map(|(n, id)| ((*n).to_string(), (*id).to_string()))
                .collect())
        }
        fn installed_ids(&self) -> Result<HashSet<String>, SourceError> {
            Ok(self.installed.iter().map(|s| (*s).to_string()).collect())
        }
    }

    #[test]
    /// What: Records carry the application id as install key and match installed ids
    ///
    /// - Input: Two remote apps, one installed
    /// - Output: Display name differs from install key; installed set by id membership
    fn flatpak_records_key_on_application_id() {
        let src = FakeFlatpak {
            available: true,
            flathub: true,
            apps: vec![("GIMP", "org.gimp.GIMP"), ("Krita", "org.kde.krita")],
            installed: vec!["org.gimp.GIMP"],
        };
        let recs = flatpak_records(&src);
        assert_eq!(recs.len(), 2);
        assert_eq!(recs[0].name, "GIMP");
        assert_eq!(recs[0].install_target(), "org.gimp.GIMP");
        assert!(recs[0].installed);
        assert!(!recs[1].installed);
    }

    #[test]
    /// What: Missing tool or disabled remote yields no records
    ///
    /// - Input: Adapter with availability off, then flathub off
    /// - Output: Empty vectors in both cases
    fn flatpak_records_gating() {
        let no_tool = FakeFlatpak {
            available: false,
            flathub: true,
            apps: vec![("GIMP", "org.gimp.GIMP")],
            installed: vec![],
        };
        assert!(flatpak_records(&no_tool).is_empty());

        let no_remote = FakeFlatpak {
            available: true,
            flathub: false,
            apps: vec![("GIMP", "org.gimp.GIMP")],
            installed: vec![],
        };
        assert!(flatpak_records(&no_remote).is_empty());
    }
}
