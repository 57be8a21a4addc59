//! Command-line argument definition for the headless front.

use clap::Parser;

/// pacdeck — browse and manage pacman, Flatpak, and AUR packages from one catalog
#[derive(Parser, Debug)]
#[command(name = "pacdeck")]
#[command(version)]
#[command(
    about = "Browse and manage pacman, Flatpak, and AUR packages from one catalog",
    long_about = None
)]
pub struct Args {
    /// Tab to render: installed, available, flatpak, aur, or all
    #[arg(long, default_value = "all")]
    pub view: String,

    /// Search text; a non-empty search always renders the all view
    #[arg(short, long)]
    pub search: Option<String>,

    /// Zero-based page to load through (each page appends page-size rows)
    #[arg(long, default_value_t = 0)]
    pub page: usize,

    /// Emit rows as JSON instead of aligned text
    #[arg(long)]
    pub json: bool,

    /// Show detail text for one package and exit
    #[arg(long, value_name = "NAME")]
    pub info: Option<String>,

    /// Install a package by name (repo packages win over same-named AUR ones)
    #[arg(short, long, value_name = "NAME")]
    pub install: Option<String>,

    /// Remove a package by name
    #[arg(short, long, value_name = "NAME")]
    pub remove: Option<String>,

    /// Run a full system update
    #[arg(short, long)]
    pub update: bool,

    /// Print privileged commands instead of executing them
    #[arg(long)]
    pub dry_run: bool,

    /// Logging level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    pub log_level: String,
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::Args;

    #[test]
    /// What: Defaults and flag parsing for the common invocations
    ///
    /// - Input: Bare invocation; list with search; an install request
    /// - Output: Expected field values
    fn args_parse_shapes() {
        let a = Args::parse_from(["pacdeck"]);
        assert_eq!(a.view, "all");
        assert_eq!(a.page, 0);
        assert!(!a.json);
        assert!(a.search.is_none());

        let a = Args::parse_from(["pacdeck", "--view", "installed", "-s", "fire", "--page", "2"]);
        assert_eq!(a.view, "installed");
        assert_eq!(a.search.as_deref(), Some("fire"));
        assert_eq!(a.page, 2);

        let a = Args::parse_from(["pacdeck", "-i", "ripgrep", "--dry-run"]);
        assert_eq!(a.install.as_deref(), Some("ripgrep"));
        assert!(a.dry_run);
    }
}
