//! Session-scoped controller owning the catalog and view pipeline.
//!
//! One [`Session`] exists per application run, owned by the control task.
//! Workers never touch it: they hand plain data back over channels and the
//! control task folds results in through the `apply_*` methods. Everything
//! here is synchronous in-memory work (filtering, ranking, slicing), fast
//! enough to run inline.

use crate::catalog::{self, Catalog, InstalledSets};
use crate::config::Settings;
use crate::logic;
use crate::sources::AurSearchCache;
use crate::state::{Page, RankedMatch, SummaryCounts, View, ViewState};

/// What the caller must do after a search-text change.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SearchOutcome {
    /// The pipeline is up to date; nothing external to run.
    Done,
    /// Start an asynchronous AUR search for this term, then feed the hits
    /// back through [`Session::apply_aur_hits`].
    SearchAur(String),
}

/// Control-task context: catalog, search cache, view state, and knobs.
///
/// There is no ambient global state anywhere in the engine; every component
/// reads what it needs from here.
#[derive(Debug)]
pub struct Session {
    catalog: Catalog,
    state: ViewState,
    /// Ranked results for the current (view, search) pair, memoized so
    /// "load more" never recomputes the ranking.
    ranked: Vec<RankedMatch>,
    aur_cache: AurSearchCache,
    fuzzy_threshold: f64,
    page_size: usize,
    aur_enabled: bool,
    operation_in_flight: bool,
}

impl Session {
    /// Create a session with an empty catalog and the given knobs.
    #[must_use]
    pub fn new(settings: Settings) -> Self {
        Self {
            catalog: Catalog::new(),
            state: ViewState::default(),
            ranked: Vec::new(),
            aur_cache: AurSearchCache::new(),
            fuzzy_threshold: settings.fuzzy_threshold.clamp(0.0, 1.0),
            page_size: settings.page_size.max(1),
            aur_enabled: settings.aur_enabled,
            operation_in_flight: false,
        }
    }

    /// Active view.
    #[must_use]
    pub const fn view(&self) -> View {
        self.state.view
    }

    /// Current search text.
    #[must_use]
    pub fn search_text(&self) -> &str {
        &self.state.search_text
    }

    /// Current zero-based page index.
    #[must_use]
    pub const fn page_index(&self) -> usize {
        self.state.page_index
    }

    /// The catalog as currently loaded.
    #[must_use]
    pub const fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Whether the AUR source participates.
    #[must_use]
    pub const fn aur_enabled(&self) -> bool {
        self.aur_enabled
    }

    /// What: Switch the active tab.
    ///
    /// Details:
    /// - Resets the page cursor to 0 and re-runs the filter pipeline; the
    ///   view layer must clear previously rendered rows.
    pub fn set_view(&mut self, view: View) {
        self.state.view = view;
        self.state.page_index = 0;
        self.rerank();
    }

    /// What: Apply a new search text.
    ///
    /// Inputs:
    /// - `text`: Raw text as typed
    ///
    /// Output:
    /// - [`SearchOutcome::SearchAur`] when an external AUR search should
    ///   start; [`SearchOutcome::Done`] otherwise
    ///
    /// Details:
    /// - A non-empty term forces the `all` view so matches from every source
    ///   are visible without switching tabs, and resets the page cursor.
    /// - A cached term is merged immediately (installed-status correction is
    ///   re-applied by the merge against the current catalog) without
    ///   re-invoking the external search.
    pub fn set_search(&mut self, text: impl Into<String>) -> SearchOutcome {
        let text = text.into();
        self.state.search_text = text;
        self.state.page_index = 0;
        let term = self.state.search_text.trim().to_string();
        if !term.is_empty() {
            self.state.view = View::All;
        }
        if term.is_empty() || !self.aur_enabled {
            self.rerank();
            return SearchOutcome::Done;
        }
        if let Some(hits) = self.aur_cache.get(&self.state.search_text) {
            tracing::debug!(term = %self.state.search_text, "AUR search served from cache");
            catalog::merge::merge_aur_hits(&mut self.catalog, &hits);
            self.rerank();
            return SearchOutcome::Done;
        }
        self.rerank();
        SearchOutcome::SearchAur(self.state.search_text.clone())
    }

    /// What: Advance the cursor by one page.
    ///
    /// Output:
    /// - `true` when there was another page to advance to
    pub fn load_more(&mut self) -> bool {
        if logic::has_more(self.ranked.len(), self.state.page_index, self.page_size) {
            self.state.page_index += 1;
            true
        } else {
            false
        }
    }

    /// What: Materialize the current page.
    ///
    /// Output:
    /// - Rows for the current page (page 0 replaces rendered state, later
    ///   pages append), whether more pages exist, and summary counts
    #[must_use]
    pub fn get_page(&self) -> Page {
        let len = self.ranked.len();
        let range = logic::append_range(len, self.state.page_index, self.page_size);
        let rows = self.ranked[range]
            .iter()
            .map(|m| m.record.clone())
            .collect();
        Page {
            rows,
            has_more: logic::has_more(len, self.state.page_index, self.page_size),
            counts: self.counts(),
        }
    }

    /// Every row from page 0 through the current page, for renderers that
    /// draw from scratch.
    #[must_use]
    pub fn rows_through_current_page(&self) -> Vec<crate::state::PackageRecord> {
        let range =
            logic::cumulative_range(self.ranked.len(), self.state.page_index, self.page_size);
        self.ranked[range].iter().map(|m| m.record.clone()).collect()
    }

    fn counts(&self) -> SummaryCounts {
        let len = self.ranked.len();
        let shown = logic::cumulative_range(len, self.state.page_index, self.page_size).end;
        SummaryCounts {
            total_matches: len,
            shown,
            installed_matches: self.ranked.iter().filter(|m| m.record.installed).count(),
        }
    }

    /// What: Replace the catalog wholesale after a full load.
    ///
    /// Details:
    /// - Keeps view and search, resets the page cursor: the ranked list is
    ///   rebuilt and previously rendered rows are stale.
    pub fn apply_full_load(&mut self, catalog: Catalog) {
        self.catalog = catalog;
        self.state.page_index = 0;
        self.rerank();
    }

    /// What: Fold AUR search hits for `term` into cache and catalog.
    ///
    /// Details:
    /// - Hits are memoized regardless; the catalog is only merged when the
    ///   term still matches the live search text (a stale arrival after the
    ///   user kept typing is dropped, last write wins).
    pub fn apply_aur_hits(&mut self, term: &str, hits: Vec<String>) {
        self.aur_cache.put(term, hits.clone());
        if term == self.state.search_text {
            catalog::merge::merge_aur_hits(&mut self.catalog, &hits);
            self.rerank();
        } else {
            tracing::debug!(term, "stale AUR search result cached only");
        }
    }

    /// What: Patch installed flags from freshly gathered sets.
    ///
    /// Details:
    /// - Re-runs the ranking (view membership may change) and clamps the
    ///   page cursor into the shrunken result list when needed.
    pub fn apply_reconciled(&mut self, sets: &InstalledSets) {
        catalog::reconcile::apply(&mut self.catalog, sets);
        self.rerank();
        self.clamp_page();
    }

    /// What: Claim the single-flight operation slot.
    ///
    /// Output:
    /// - `false` when another privileged operation is still in flight; the
    ///   request must be rejected, not queued
    pub fn begin_operation(&mut self) -> bool {
        if self.operation_in_flight {
            tracing::warn!("operation rejected: another one is in flight");
            return false;
        }
        self.operation_in_flight = true;
        true
    }

    /// Release the operation slot; reconciliation follows regardless of the
    /// operation's exit status.
    pub fn finish_operation(&mut self) {
        self.operation_in_flight = false;
    }

    /// Whether a privileged operation is currently running.
    #[must_use]
    pub const fn operation_in_flight(&self) -> bool {
        self.operation_in_flight
    }

    /// What: Update the fuzzy threshold, clamped to `[0.0, 1.0]`.
    pub fn set_fuzzy_threshold(&mut self, value: f64) {
        self.fuzzy_threshold = value.clamp(0.0, 1.0);
        self.rerank();
        self.clamp_page();
    }

    /// Current fuzzy threshold.
    #[must_use]
    pub const fn fuzzy_threshold(&self) -> f64 {
        self.fuzzy_threshold
    }

    /// What: Update the page size (minimum 1). Resets the page cursor since
    /// chunk boundaries shift.
    pub fn set_page_size(&mut self, value: usize) {
        self.page_size = value.max(1);
        self.state.page_index = 0;
    }

    /// Current page size.
    #[must_use]
    pub const fn page_size(&self) -> usize {
        self.page_size
    }

    /// What: Explain an empty result list for the current tab.
    ///
    /// Inputs:
    /// - `aur_available`: Whether an AUR helper exists on this system
    /// - `flatpak_available`: Whether the flatpak tool exists
    ///
    /// Output:
    /// - `None` while results exist; otherwise a message naming the cause
    ///   (source missing, feature disabled, or simply no matches)
    #[must_use]
    pub fn empty_reason(&self, aur_available: bool, flatpak_available: bool) -> Option<String> {
        if !self.ranked.is_empty() {
            return None;
        }
        let msg = match self.state.view {
            View::Flatpak if !flatpak_available => {
                "Flatpak is not installed on this system".to_string()
            }
            View::Aur if !self.aur_enabled => "AUR support is disabled in settings".to_string(),
            View::Aur if !aur_available => {
                "No AUR helper (paru or yay) was found on this system".to_string()
            }
            _ if self.catalog.is_empty() => {
                "The package catalog is empty; check that pacman is available".to_string()
            }
            _ if self.state.search_text.trim().is_empty() => format!(
                "Nothing to show on the {} tab",
                self.state.view.as_config_key()
            ),
            _ => format!("No packages match \"{}\"", self.state.search_text),
        };
        Some(msg)
    }

    fn rerank(&mut self) {
        self.ranked = logic::rank(
            &self.catalog,
            self.state.view,
            &self.state.search_text,
            self.fuzzy_threshold,
        );
    }

    fn clamp_page(&mut self) {
        if self.ranked.is_empty() {
            self.state.page_index = 0;
            return;
        }
        let last = (self.ranked.len() - 1) / self.page_size;
        self.state.page_index = self.state.page_index.min(last);
    }
}
