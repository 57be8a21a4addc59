//! View predicates and the rank-and-threshold filter pipeline.

use crate::catalog::Catalog;
use crate::state::{PackageRecord, RankedMatch, SourceKind, View};

use super::score::score;

/// What: Decide whether `rec` belongs to the candidate subset of `view`.
///
/// Inputs:
/// - `view`: Active tab
/// - `rec`: Catalog record
///
/// Output:
/// - `true` when the record passes the tab's predicate
///
/// Details:
/// - The AUR tab shows uninstalled records too, since search hits are
///   legitimate members; the flatpak and installed tabs show installed
///   records of their respective kinds only.
#[must_use]
pub fn view_accepts(view: View, rec: &PackageRecord) -> bool {
    match view {
        View::Installed => rec.installed && rec.source_kind == SourceKind::Pacman,
        View::Flatpak => rec.installed && rec.source_kind == SourceKind::Flatpak,
        View::Aur => rec.source_kind == SourceKind::Aur,
        View::Available => !rec.installed,
        View::All => true,
    }
}

/// What: Rank the catalog subset for a view against a search string.
///
/// Inputs:
/// - `catalog`: Catalog to read (never mutated)
/// - `view`: Active tab selecting the candidate subset
/// - `search_text`: Raw search text; empty means "match everything"
/// - `threshold`: Inclusive minimum score for non-substring matches
///
/// Output:
/// - Matches sorted by score descending; ties keep catalog insertion order
///
/// Details:
/// - An empty search scores every candidate 1.0 and preserves insertion
///   order outright.
/// - An empty catalog or candidate subset yields an empty result, never an
///   error; callers render an empty-state message instead.
#[must_use]
pub fn rank(
    catalog: &Catalog,
    view: View,
    search_text: &str,
    threshold: f64,
) -> Vec<RankedMatch> {
    let candidates = catalog.records().iter().filter(|r| view_accepts(view, r));
    if search_text.is_empty() {
        return candidates
            .map(|r| RankedMatch {
                record: r.clone(),
                score: 1.0,
            })
            .collect();
    }

    let needle = search_text.to_lowercase();
    let mut matches: Vec<RankedMatch> = candidates
        .filter_map(|r| {
            let s = score(&r.name, &needle);
            (s >= threshold).then(|| RankedMatch {
                record: r.clone(),
                score: s,
            })
        })
        .collect();
    // Stable sort keeps catalog order among equal scores.
    matches.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    matches
}

#[cfg(test)]
mod tests {
    use super::{rank, view_accepts};
    use crate::catalog::Catalog;
    use crate::state::{PackageRecord, View};

    fn sample() -> Catalog {
        Catalog::from_records(vec![
            PackageRecord::pacman("firefox", "extra", true),
            PackageRecord::pacman("vim", "extra", false),
            PackageRecord::flatpak("GIMP", "org.gimp.GIMP", true),
            PackageRecord::aur("firefox-esr", false),
            PackageRecord::aur("paru-bin", true),
        ])
    }

    #[test]
    /// What: Each view selects its documented candidate subset
    ///
    /// - Input: One record per interesting (kind, installed) combination
    /// - Output: Membership per view matches the predicate table
    fn filter_view_predicates() {
        let cat = sample();
        let names_for = |view: View| -> Vec<String> {
            cat.records()
                .iter()
                .filter(|r| view_accepts(view, r))
                .map(|r| r.name.clone())
                .collect()
        };
        assert_eq!(names_for(View::Installed), vec!["firefox"]);
        assert_eq!(names_for(View::Flatpak), vec!["GIMP"]);
        assert_eq!(names_for(View::Aur), vec!["firefox-esr", "paru-bin"]);
        assert_eq!(names_for(View::Available), vec!["vim", "firefox-esr"]);
        assert_eq!(names_for(View::All).len(), 5);
    }

    #[test]
    /// What: Empty search keeps insertion order with uniform 1.0 scores
    ///
    /// - Input: Sample catalog, all view, empty search, called twice
    /// - Output: Identical ordered output both times (idempotent)
    fn filter_empty_search_stable_and_idempotent() {
        let cat = sample();
        let a = rank(&cat, View::All, "", 0.4);
        let b = rank(&cat, View::All, "", 0.4);
        assert_eq!(a.len(), 5);
        assert!(a.iter().all(|m| (m.score - 1.0).abs() < f64::EPSILON));
        let names_a: Vec<&str> = a.iter().map(|m| m.record.name.as_str()).collect();
        let names_b: Vec<&str> = b.iter().map(|m| m.record.name.as_str()).collect();
        assert_eq!(names_a, names_b);
        assert_eq!(
            names_a,
            vec!["firefox", "vim", "GIMP", "firefox-esr", "paru-bin"]
        );
    }

    #[test]
    /// What: Substring matches outrank fuzzy ones and keep tie order
    ///
    /// - Input: Search "firefox" over the all view
    /// - Output: Both substring holders score 1.0, insertion order preserved,
    ///   ranked at or above every non-substring match
    fn filter_substring_priority_and_tie_order() {
        let cat = sample();
        let ranked = rank(&cat, View::All, "firefox", 0.0);
        assert!(ranked.len() >= 2);
        assert_eq!(ranked[0].record.name, "firefox");
        assert_eq!(ranked[1].record.name, "firefox-esr");
        assert!((ranked[0].score - 1.0).abs() < f64::EPSILON);
        assert!((ranked[1].score - 1.0).abs() < f64::EPSILON);
        for m in &ranked[2..] {
            assert!(m.score < 1.0);
        }
    }

    #[test]
    /// What: The threshold comparison is inclusive
    ///
    /// - Input: A name whose similarity to the needle is exactly 0.4, with
    ///   thresholds straddling that value
    /// - Output: Included at 0.4, excluded just above it
    fn filter_threshold_boundary_inclusive() {
        // "abcde" vs "abxxx": distance 3 over length 5 => similarity 0.4.
        let cat = Catalog::from_records(vec![PackageRecord::pacman("abcde", "extra", false)]);
        let at = rank(&cat, View::All, "abxxx", 0.4);
        assert_eq!(at.len(), 1);
        assert!((at[0].score - 0.4).abs() < 1e-9);
        let above = rank(&cat, View::All, "abxxx", 0.41);
        assert!(above.is_empty());
    }

    #[test]
    /// What: Example scenario from the tab behavior table
    ///
    /// - Input: firefox (pacman, installed) and firefox-esr (aur, not
    ///   installed); search "firefox"
    /// - Output: Both score 1.0 in insertion order on all; only firefox on
    ///   installed
    fn filter_example_scenario() {
        let cat = Catalog::from_records(vec![
            PackageRecord::pacman("firefox", "extra", true),
            PackageRecord::aur("firefox-esr", false),
        ]);
        let all = rank(&cat, View::All, "firefox", 0.4);
        let names: Vec<&str> = all.iter().map(|m| m.record.name.as_str()).collect();
        assert_eq!(names, vec!["firefox", "firefox-esr"]);
        assert!(all.iter().all(|m| (m.score - 1.0).abs() < f64::EPSILON));

        let installed = rank(&cat, View::Installed, "firefox", 0.4);
        let names: Vec<&str> = installed.iter().map(|m| m.record.name.as_str()).collect();
        assert_eq!(names, vec!["firefox"]);
    }

    #[test]
    /// What: Empty catalogs and empty candidate subsets yield empty results
    ///
    /// - Input: Empty catalog; catalog with no flatpak records on the
    ///   flatpak view
    /// - Output: Empty vectors, no error
    fn filter_empty_inputs() {
        let empty = Catalog::new();
        assert!(rank(&empty, View::All, "anything", 0.4).is_empty());

        let cat = Catalog::from_records(vec![PackageRecord::pacman("vim", "extra", true)]);
        assert!(rank(&cat, View::Flatpak, "", 0.4).is_empty());
    }
}
