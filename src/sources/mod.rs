//! Package source adapters and the collaborator seams they implement.
//!
//! Each adapter translates one external tool's listing output into
//! normalized [`PackageRecord`](crate::state::PackageRecord) values. Failures
//! never cross the adapter boundary: the degrade-to-empty entry points in the
//! submodules catch every [`SourceError`], log its class, and yield zero
//! records so the catalog pipeline downstream never handles a failure
//! mid-computation.

use std::collections::HashSet;

/// AUR helper adapter and per-term search cache.
pub mod aur;
/// Flatpak adapter.
pub mod flatpak;
/// Official repository (pacman) adapter.
pub mod repo;

pub use aur::{AurSearchCache, SystemAur};
pub use flatpak::SystemFlatpak;
pub use repo::SystemRepo;

/// Why a source yielded nothing, classified per failure kind so callers can
/// log and message each class distinctly.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// The backing tool is missing from PATH or the feature is disabled.
    #[error("{tool} is not usable here: {reason}")]
    Unavailable {
        /// Tool or feature name.
        tool: &'static str,
        /// Human-readable explanation (missing binary, disabled remote, ...).
        reason: String,
    },
    /// The tool ran but could not produce a listing (spawn error other than
    /// not-found, or a non-zero exit).
    #[error("{tool} invocation failed: {detail}")]
    Fetch {
        /// Tool name.
        tool: &'static str,
        /// Failure detail including the attempted arguments.
        detail: String,
    },
    /// The tool produced output this adapter could not interpret.
    #[error("{tool} produced unusable output: {detail}")]
    Parse {
        /// Tool name.
        tool: &'static str,
        /// Parse failure detail.
        detail: String,
    },
}

impl SourceError {
    /// Short class label used in structured log fields.
    #[must_use]
    pub const fn class(&self) -> &'static str {
        match self {
            SourceError::Unavailable { .. } => "unavailable",
            SourceError::Fetch { .. } => "fetch",
            SourceError::Parse { .. } => "parse",
        }
    }
}

/// What: Execute `tool` with `args` and capture stdout.
///
/// Inputs:
/// - `tool`: Binary name resolved via PATH
/// - `args`: Arguments passed verbatim
///
/// Output:
/// - Stdout as UTF-8 on success; a classified [`SourceError`] otherwise
///
/// # Errors
/// - [`SourceError::Unavailable`] when the binary is not found
/// - [`SourceError::Fetch`] on other spawn failures or a non-zero exit
/// - [`SourceError::Parse`] when stdout is not valid UTF-8
///
/// Details:
/// - Blocking; adapter calls run inside `tokio::task::spawn_blocking`.
pub fn run_tool(tool: &'static str, args: &[&str]) -> Result<String, SourceError> {
    let out = std::process::Command::new(tool)
        .args(args)
        .output()
        .map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                SourceError::Unavailable {
                    tool,
                    reason: "not found on PATH".to_string(),
                }
            } else {
                SourceError::Fetch {
                    tool,
                    detail: e.to_string(),
                }
            }
        })?;
    if !out.status.success() {
        return Err(SourceError::Fetch {
            tool,
            detail: format!("{args:?} exited with {}", out.status),
        });
    }
    String::from_utf8(out.stdout).map_err(|e| SourceError::Parse {
        tool,
        detail: e.to_string(),
    })
}

/// Official repository listings consumed by the catalog.
pub trait RepoSource: Send + Sync {
    /// Names of all locally installed packages.
    ///
    /// # Errors
    /// Returns a [`SourceError`] when the listing tool fails.
    fn installed_names(&self) -> Result<HashSet<String>, SourceError>;

    /// Every package available in the enabled repositories as
    /// `(name, repository)` pairs.
    ///
    /// # Errors
    /// Returns a [`SourceError`] when the listing tool fails.
    fn available_packages(&self) -> Result<Vec<(String, String)>, SourceError>;

    /// Detail text for one package: remote info when known, installed info
    /// as fallback, `None` when the name is unknown to both.
    ///
    /// # Errors
    /// Returns a [`SourceError`] when the info tool cannot run at all.
    fn package_info(&self, name: &str) -> Result<Option<String>, SourceError>;
}

/// Flatpak remote and installation listings consumed by the catalog.
pub trait FlatpakSource: Send + Sync {
    /// Whether the flatpak tool exists on this system at all.
    fn is_available(&self) -> bool;

    /// Whether the flathub remote is configured.
    ///
    /// # Errors
    /// Returns a [`SourceError`] when the remote listing fails.
    fn flathub_enabled(&self) -> Result<bool, SourceError>;

    /// Applications published on flathub as `(name, application id)` pairs.
    ///
    /// # Errors
    /// Returns a [`SourceError`] when the remote listing fails.
    fn remote_apps(&self) -> Result<Vec<(String, String)>, SourceError>;

    /// Application ids of locally installed flatpaks.
    ///
    /// # Errors
    /// Returns a [`SourceError`] when the local listing fails.
    fn installed_ids(&self) -> Result<HashSet<String>, SourceError>;
}

/// AUR helper capabilities consumed by the catalog.
pub trait AurSource: Send + Sync {
    /// Whether an AUR helper binary was found on this system.
    fn helper_available(&self) -> bool;

    /// Names of installed AUR (foreign) packages; the status truth for
    /// reconciliation.
    ///
    /// # Errors
    /// Returns a [`SourceError`] when the listing tool fails.
    fn installed_names(&self) -> Result<HashSet<String>, SourceError>;

    /// Name-only search results for `term`, in helper output order.
    ///
    /// # Errors
    /// Returns a [`SourceError`] when no helper exists or the search fails.
    fn search(&self, term: &str) -> Result<Vec<String>, SourceError>;
}
