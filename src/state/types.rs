//! Core value types shared across the pacdeck catalog engine.

/// Package source origin.
///
/// A closed tag, not a subtype: every downstream decision (view predicates,
/// reconciliation keys, operation command shape) switches on this value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// Official repository package managed by pacman.
    Pacman,
    /// Flatpak application from the flathub remote.
    Flatpak,
    /// Arch User Repository package managed through an AUR helper.
    Aur,
}

impl SourceKind {
    /// Return the lowercase label used in logs and CLI output.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            SourceKind::Pacman => "pacman",
            SourceKind::Flatpak => "flatpak",
            SourceKind::Aur => "aur",
        }
    }
}

/// One row of the catalog: a package as known to exactly one source.
///
/// The same display name may appear once per source (e.g. available in both
/// the official repos and the AUR); within a single source the adapters emit
/// each name at most once.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct PackageRecord {
    /// Name shown to the user. For pacman and AUR this is also the install key.
    pub name: String,
    /// Provenance label for display (repository name, "flathub", or "aur").
    pub origin_label: String,
    /// Whether the package is currently installed. The most frequently
    /// rewritten field; patched in place by reconciliation.
    pub installed: bool,
    /// Which source produced this record.
    pub source_kind: SourceKind,
    /// Identifier handed to the underlying tool when it differs from `name`.
    /// Present and non-empty for flatpak (the reverse-DNS application id),
    /// absent otherwise.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub install_key: Option<String>,
}

impl PackageRecord {
    /// Build an official-repository record.
    #[must_use]
    pub fn pacman(name: impl Into<String>, repo: impl Into<String>, installed: bool) -> Self {
        Self {
            name: name.into(),
            origin_label: repo.into(),
            installed,
            source_kind: SourceKind::Pacman,
            install_key: None,
        }
    }

    /// Build a flatpak record. `app_id` is the reverse-DNS application id and
    /// must be non-empty; it is what install/remove commands operate on.
    #[must_use]
    pub fn flatpak(name: impl Into<String>, app_id: impl Into<String>, installed: bool) -> Self {
        Self {
            name: name.into(),
            origin_label: "flathub".to_string(),
            installed,
            source_kind: SourceKind::Flatpak,
            install_key: Some(app_id.into()),
        }
    }

    /// Build an AUR record.
    #[must_use]
    pub fn aur(name: impl Into<String>, installed: bool) -> Self {
        Self {
            name: name.into(),
            origin_label: "aur".to_string(),
            installed,
            source_kind: SourceKind::Aur,
            install_key: None,
        }
    }

    /// The identifier external tools act on: the application id for flatpak,
    /// the display name otherwise.
    #[must_use]
    pub fn install_target(&self) -> &str {
        self.install_key.as_deref().unwrap_or(&self.name)
    }
}

/// A transient (record, score) pair produced by the ranker.
///
/// Scores live in `[0.0, 1.0]`; 1.0 means case-insensitive substring
/// containment (or an empty search). Never persisted, recomputed on every
/// filter pass.
#[derive(Clone, Debug)]
pub struct RankedMatch {
    /// The matched catalog record.
    pub record: PackageRecord,
    /// Similarity score in `[0.0, 1.0]`.
    pub score: f64,
}

/// Named filter over the catalog, one per front-end tab.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum View {
    /// Installed official-repository packages.
    Installed,
    /// Not-installed packages from any source.
    Available,
    /// Installed flatpak applications.
    Flatpak,
    /// Every AUR record, installed or not.
    Aur,
    /// The whole catalog.
    #[default]
    All,
}

impl View {
    /// Return the string key used in settings files and on the CLI.
    #[must_use]
    pub const fn as_config_key(self) -> &'static str {
        match self {
            View::Installed => "installed",
            View::Available => "available",
            View::Flatpak => "flatpak",
            View::Aur => "aur",
            View::All => "all",
        }
    }

    /// Parse a view from its settings key (case-insensitive).
    #[must_use]
    pub fn from_config_key(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "installed" => Some(View::Installed),
            "available" => Some(View::Available),
            "flatpak" => Some(View::Flatpak),
            "aur" => Some(View::Aur),
            "all" | "everything" => Some(View::All),
            _ => None,
        }
    }
}

/// Current tab, search text, and pagination position.
///
/// Owned exclusively by the control task; workers never see it.
#[derive(Clone, Debug, Default)]
pub struct ViewState {
    /// Active tab.
    pub view: View,
    /// Raw search text as typed.
    pub search_text: String,
    /// Zero-based page index; reset to 0 on tab or search change.
    pub page_index: usize,
}

/// Totals shown alongside a page of results.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize)]
pub struct SummaryCounts {
    /// Ranked matches for the current view and search.
    pub total_matches: usize,
    /// Rows materialized through the current page (cumulative).
    pub shown: usize,
    /// Matches that are currently installed.
    pub installed_matches: usize,
}

/// One materialized page of results handed to the view layer.
#[derive(Clone, Debug)]
pub struct Page {
    /// Rows for this page. Page 0 replaces all rendered rows; later pages
    /// are appended to what is already on screen.
    pub rows: Vec<PackageRecord>,
    /// Whether another page exists past this one.
    pub has_more: bool,
    /// Totals for the status line.
    pub counts: SummaryCounts,
}

#[cfg(test)]
mod tests {
    use super::{PackageRecord, SourceKind, View};

    #[test]
    /// What: View config key mapping round-trips and rejects unknown keys
    ///
    /// - Input: Known keys, alias, mixed case, unknown key
    /// - Output: Correct variants; None for unknown
    fn state_view_config_roundtrip_and_aliases() {
        for v in [
            View::Installed,
            View::Available,
            View::Flatpak,
            View::Aur,
            View::All,
        ] {
            assert_eq!(View::from_config_key(v.as_config_key()), Some(v));
        }
        assert_eq!(View::from_config_key("Everything"), Some(View::All));
        assert_eq!(View::from_config_key(" AUR "), Some(View::Aur));
        assert_eq!(View::from_config_key("unknown"), None);
    }

    #[test]
    /// What: Install target falls back to the name unless an install key exists
    ///
    /// - Input: pacman, AUR, and flatpak records
    /// - Output: name for pacman/AUR, application id for flatpak
    fn state_install_target_prefers_key() {
        let p = PackageRecord::pacman("firefox", "extra", true);
        assert_eq!(p.install_target(), "firefox");
        assert_eq!(p.origin_label, "extra");

        let a = PackageRecord::aur("paru-bin", false);
        assert_eq!(a.install_target(), "paru-bin");
        assert_eq!(a.origin_label, "aur");

        let f = PackageRecord::flatpak("GIMP", "org.gimp.GIMP", false);
        assert_eq!(f.install_target(), "org.gimp.GIMP");
        assert_eq!(f.source_kind, SourceKind::Flatpak);
        assert_eq!(f.origin_label, "flathub");
    }
}
