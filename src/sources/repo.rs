//! Official repository adapter backed by pacman.

use std::collections::HashSet;

use crate::state::PackageRecord;

use super::{RepoSource, SourceError, run_tool};

/// Repo adapter that shells out to the system pacman.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemRepo;

impl RepoSource for SystemRepo {
    fn installed_names(&self) -> Result<HashSet<String>, SourceError> {
        let body = run_tool("pacman", &["-Qq"])?;
        Ok(body.lines().map(|l| l.trim().to_string()).collect())
    }

    fn available_packages(&self) -> Result<Vec<(String, String)>, SourceError> {
        // `pacman -Sl` lines read `repo name version [installed]`.
        let body = run_tool("pacman", &["-Sl"])?;
        let mut out = Vec::new();
        for line in body.lines() {
            let mut parts = line.split_whitespace();
            if let (Some(repo), Some(name)) = (parts.next(), parts.next()) {
                out.push((name.to_string(), repo.to_string()));
            }
        }
        if out.is_empty() && !body.trim().is_empty() {
            return Err(SourceError::Parse {
                tool: "pacman",
                detail: "no package lines recognized in -Sl output".to_string(),
            });
        }
        Ok(out)
    }

    fn package_info(&self, name: &str) -> Result<Option<String>, SourceError> {
        // Remote info first, installed info as fallback; an unknown name
        // makes pacman exit non-zero, which is not a fetch failure here.
        for args in [["-Si", name], ["-Qi", name]] {
            match run_tool("pacman", &args) {
                Ok(body) if !body.trim().is_empty() => return Ok(Some(body)),
                Ok(_) | Err(SourceError::Fetch { .. }) => {}
                Err(e) => return Err(e),
            }
        }
        Ok(None)
    }
}

/// What: Produce normalized records for every available repo package.
///
/// Inputs:
/// - `src`: Repo listing capability
///
/// Output:
/// - One record per distinct package name, `installed` set by membership in
///   the locally-installed set; empty on any failure
///
/// Details:
/// - Cross-references the full listing against the installed set in O(n).
/// - Degrades to empty and logs the failure class; never propagates.
#[must_use]
pub fn repo_records(src: &dyn RepoSource) -> Vec<PackageRecord> {
    let installed = match src.installed_names() {
        Ok(set) => set,
        Err(e) => {
            tracing::warn!(class = e.class(), error = %e, "repo installed listing degraded to empty");
            return Vec::new();
        }
    };
    let available = match src.available_packages() {
        Ok(list) => list,
        Err(e) => {
            tracing::warn!(class = e.class(), error = %e, "repo listing degraded to empty");
            return Vec::new();
        }
    };
    let mut seen = HashSet::new();
    let mut records = Vec::with_capacity(available.len());
    for (name, repo) in available {
        if !seen.insert(name.clone()) {
            continue;
        }
        let is_installed = installed.contains(&name);
        records.push(PackageRecord::pacman(name, repo, is_installed));
    }
    records
}
