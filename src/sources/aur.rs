//! AUR adapter backed by an AUR helper, plus the per-term search cache.

use std::collections::HashSet;
use std::num::NonZeroUsize;

use lru::LruCache;

use crate::state::PackageRecord;

use super::{AurSource, SourceError, run_tool};

/// Most recently used search terms kept memoized per session.
const SEARCH_CACHE_CAPACITY: usize = 64;

/// AUR adapter that shells out to an installed helper.
///
/// Helper discovery prefers `paru` and falls back to `yay`; the installed-AUR
/// listing goes through pacman's foreign-package query so it works even when
/// no helper is present.
#[derive(Clone, Debug)]
pub struct SystemAur {
    helper: Option<&'static str>,
}

impl SystemAur {
    /// Probe PATH for a supported helper.
    #[must_use]
    pub fn discover() -> Self {
        let helper = ["paru", "yay"]
            .into_iter()
            .find(|h| which::which(h).is_ok());
        if let Some(h) = helper {
            tracing::debug!(helper = h, "AUR helper found");
        }
        Self { helper }
    }

    /// The helper binary name, when one was found.
    #[must_use]
    pub const fn helper(&self) -> Option<&'static str> {
        self.helper
    }
}

impl AurSource for SystemAur {
    fn helper_available(&self) -> bool {
        self.helper.is_some()
    }

    fn installed_names(&self) -> Result<HashSet<String>, SourceError> {
        // Foreign packages (`-Qm`) are the installed-AUR truth and stay
        // queryable even without a helper.
        let body = run_tool("pacman", &["-Qmq"])?;
        Ok(body.lines().map(|l| l.trim().to_string()).collect())
    }

    fn search(&self, term: &str) -> Result<Vec<String>, SourceError> {
        let Some(helper) = self.helper else {
            return Err(SourceError::Unavailable {
                tool: "aur helper",
                reason: "neither paru nor yay found on PATH".to_string(),
            });
        };
        let body = run_tool(helper, &["-Ssq", "--aur", term])?;
        Ok(body
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(ToString::to_string)
            .collect())
    }
}

/// What: Produce records for the installed AUR set.
///
/// Inputs:
/// - `src`: AUR listing capability
///
/// Output:
/// - One installed record per foreign package; empty on failure
#[must_use]
pub fn aur_installed_records(src: &dyn AurSource) -> Vec<PackageRecord> {
    let names = match src.installed_names() {
        Ok(set) => set,
        Err(e) => {
            tracing::warn!(class = e.class(), error = %e, "AUR installed listing degraded to empty");
            return Vec::new();
        }
    };
    let mut names: Vec<String> = names.into_iter().collect();
    names.sort();
    names
        .into_iter()
        .map(|n| PackageRecord::aur(n, true))
        .collect()
}

/// What: Run a helper search, degrading failures to no hits.
///
/// Inputs:
/// - `src`: AUR search capability
/// - `term`: Raw search term as typed
///
/// Output:
/// - Hit names in helper order, deduplicated; empty on failure
#[must_use]
pub fn aur_search_names(src: &dyn AurSource, term: &str) -> Vec<String> {
    match src.search(term) {
        Ok(names) => {
            let mut seen = HashSet::new();
            names
                .into_iter()
                .filter(|n| seen.insert(n.clone()))
                .collect()
        }
        Err(e) => {
            tracing::warn!(class = e.class(), term, error = %e, "AUR search degraded to empty");
            Vec::new()
        }
    }
}

/// Bounded memo of AUR search results keyed on the exact search text.
///
/// A repeat search for a cached term must not re-invoke the external helper;
/// the caller re-applies installed-status correction when merging, since
/// install state may have changed since the term was last searched.
#[derive(Debug)]
pub struct AurSearchCache {
    lru: LruCache<String, Vec<String>>,
}

impl AurSearchCache {
    /// Create an empty cache with the session-wide capacity bound.
    #[must_use]
    pub fn new() -> Self {
        Self {
            lru: LruCache::new(
                NonZeroUsize::new(SEARCH_CACHE_CAPACITY)
                    .unwrap_or_else(|| NonZeroUsize::new(1).expect("non-zero capacity")),
            ),
        }
    }

    /// Cached hits for `term`, refreshing its recency on hit.
    pub fn get(&mut self, term: &str) -> Option<Vec<String>> {
        self.lru.get(term).cloned()
    }

    /// Memoize `hits` for `term`, evicting the least recent term at capacity.
    pub fn put(&mut self, term: &str, hits: Vec<String>) {
        self.lru.put(term.to_string(), hits);
    }

    /// Number of memoized terms.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lru.len()
    }

    /// Whether no terms are memoized.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lru.is_empty()
    }
}

impl Default for AurSearchCache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::{
        AurSearchCache, AurSource, SourceError, aur_installed_records, aur_search_names,
    };

    struct FakeAur {
        installed: Vec<&'static str>,
        hits: Vec<&'static str>,
        fail_search: bool,
    }

    impl AurSource for FakeAur {
        fn helper_available(&self) -> bool {
            true
        }
        fn installed_names(&self) -> Result<HashSet<String>, SourceError> {
            Ok(self.installed.iter().map(|s| (*s).to_string()).collect())
        }
        fn search(&self, _term: &str) -> Result<Vec<String>, SourceError> {
            if self.fail_search {
                return Err(SourceError::Unavailable {
                    tool: "aur helper",
                    reason: "missing".to_string(),
                });
            }
            Ok(self.hits.iter().map(|s| (*s).to_string()).collect())
        }
    }

    #[test]
    /// What: Installed AUR records come back installed and name-sorted
    ///
    /// - Input: Unordered foreign package names
    /// - Output: Sorted installed records with the aur origin label
    fn aur_installed_records_sorted() {
        let src = FakeAur {
            installed: vec!["zfs-dkms", "paru-bin"],
            hits: vec![],
            fail_search: false,
        };
        let recs = aur_installed_records(&src);
        assert_eq!(recs.len(), 2);
        assert_eq!(recs[0].name, "paru-bin");
        assert_eq!(recs[1].name, "zfs-dkms");
        assert!(recs.iter().all(|r| r.installed));
        assert!(recs.iter().all(|r| r.origin_label == "aur"));
    }

    #[test]
    /// What: Search hits are deduplicated and failures degrade to no hits
    ///
    /// - Input: Duplicate hit names, then a failing search
    /// - Output: Unique names in order; empty vector on failure
    fn aur_search_dedup_and_degrade() {
        let src = FakeAur {
            installed: vec![],
            hits: vec!["yay", "yay-bin", "yay"],
            fail_search: false,
        };
        assert_eq!(aur_search_names(&src, "yay"), vec!["yay", "yay-bin"]);

        let broken = FakeAur {
            installed: vec![],
            hits: vec![],
            fail_search: true,
        };
        assert!(aur_search_names(&broken, "yay").is_empty());
    }

    #[test]
    /// What: The cache memoizes per exact term and stays bounded
    ///
    /// - Input: Two distinct terms, then a capacity-overflow insert pattern
    /// - Output: Hits retrievable per term; length never exceeds capacity
    fn aur_search_cache_memoizes_and_bounds() {
        let mut cache = AurSearchCache::new();
        assert!(cache.is_empty());
        cache.put("firefox", vec!["firefox-nightly".to_string()]);
        cache.put("Firefox", vec!["firefox-esr-bin".to_string()]);
        assert_eq!(
            cache.get("firefox").as_deref(),
            Some(&["firefox-nightly".to_string()][..])
        );
        assert_eq!(
            cache.get("Firefox").as_deref(),
            Some(&["firefox-esr-bin".to_string()][..])
        );
        assert_eq!(cache.get("fire"), None);

        for i in 0..200 {
            cache.put(&format!("term-{i}"), Vec::new());
        }
        assert!(cache.len() <= 64);
    }
}
