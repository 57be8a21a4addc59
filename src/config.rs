//! Settings persistence: a flat key file under the user config directory.
//!
//! The format is tolerant `key = value` lines with `#`/`//`/`;` comments.
//! Loading appends any missing keys with commented defaults so users can
//! discover the knobs by opening the file.

use std::path::PathBuf;

use crate::util::{parse_key_value, skip_comment_or_empty};

/// Default inclusive score threshold for non-substring matches.
pub const DEFAULT_FUZZY_THRESHOLD: f64 = 0.4;
/// Default number of rows materialized per page.
pub const DEFAULT_PAGE_SIZE: usize = 100;

/// User-tunable engine knobs.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Settings {
    /// Minimum score a non-substring match must reach, in `[0.0, 1.0]`.
    pub fuzzy_threshold: f64,
    /// Rows per page, at least 1.
    pub page_size: usize,
    /// Whether the AUR source participates at all.
    pub aur_enabled: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            fuzzy_threshold: DEFAULT_FUZZY_THRESHOLD,
            page_size: DEFAULT_PAGE_SIZE,
            aur_enabled: true,
        }
    }
}

/// What: Resolve the configuration directory, creating it best-effort.
///
/// Inputs:
/// - None (environment only)
///
/// Output:
/// - `$PACDECK_CONFIG_DIR` when set, else `~/.config/pacdeck`, else a
///   relative `.pacdeck` as a last resort
#[must_use]
pub fn config_dir() -> PathBuf {
    let dir = std::env::var_os("PACDECK_CONFIG_DIR").map_or_else(
        || {
            std::env::var_os("HOME").map_or_else(
                || PathBuf::from(".pacdeck"),
                |home| PathBuf::from(home).join(".config").join("pacdeck"),
            )
        },
        PathBuf::from,
    );
    let _ = std::fs::create_dir_all(&dir);
    dir
}

/// Directory for the rotating log file, under the config directory.
#[must_use]
pub fn logs_dir() -> PathBuf {
    let dir = config_dir().join("logs");
    let _ = std::fs::create_dir_all(&dir);
    dir
}

/// Path of the settings key file.
#[must_use]
pub fn settings_path() -> PathBuf {
    config_dir().join("settings.conf")
}

impl Settings {
    /// What: Parse settings from key-file content.
    ///
    /// Inputs:
    /// - `content`: Full file content
    ///
    /// Output:
    /// - Settings with every recognized key applied and clamped; unknown
    ///   keys and unparseable values are ignored
    #[must_use]
    pub fn parse(content: &str) -> Self {
        let mut settings = Self::default();
        for line in content.lines() {
            if skip_comment_or_empty(line) {
                continue;
            }
            let Some((raw_key, value)) = parse_key_value(line) else {
                continue;
            };
            let key = raw_key.to_lowercase().replace(['.', '-', ' '], "_");
            match key.as_str() {
                "fuzzy_threshold" => {
                    if let Ok(v) = value.parse::<f64>() {
                        settings.fuzzy_threshold = v.clamp(0.0, 1.0);
                    }
                }
                "page_size" => {
                    if let Ok(v) = value.parse::<usize>() {
                        settings.page_size = v.max(1);
                    }
                }
                "aur_enabled" => {
                    let lv = value.to_ascii_lowercase();
                    settings.aur_enabled =
                        lv == "true" || lv == "1" || lv == "yes" || lv == "on";
                }
                _ => {
                    tracing::debug!(key = %key, "unknown settings key ignored");
                }
            }
        }
        settings
    }

    /// What: Load settings from disk, seeding missing keys with defaults.
    ///
    /// Inputs:
    /// - None (reads [`settings_path`])
    ///
    /// Output:
    /// - Parsed settings; pure defaults when the file is absent or unreadable
    ///
    /// Details:
    /// - Appends commented defaults for keys the file does not mention, so
    ///   a fresh install produces a self-documenting file.
    #[must_use]
    pub fn load() -> Self {
        let path = settings_path();
        let content = std::fs::read_to_string(&path).unwrap_or_default();
        Self::ensure_keys(&path, &content);
        Self::parse(&content)
    }

    /// Append commented defaults for keys missing from `content`.
    fn ensure_keys(path: &std::path::Path, content: &str) {
        let mut missing = String::new();
        let has_key = |name: &str| {
            content.lines().any(|l| {
                !skip_comment_or_empty(l)
                    && parse_key_value(l).is_some_and(|(k, _)| {
                        k.to_lowercase().replace(['.', '-', ' '], "_") == name
                    })
            })
        };
        if !has_key("fuzzy_threshold") {
            missing.push_str(
                "# Minimum similarity (0.0-1.0) a non-substring match needs to show up\n",
            );
            missing.push_str(&format!("fuzzy_threshold = {DEFAULT_FUZZY_THRESHOLD}\n"));
        }
        if !has_key("page_size") {
            missing.push_str("# Rows loaded per page\n");
            missing.push_str(&format!("page_size = {DEFAULT_PAGE_SIZE}\n"));
        }
        if !has_key("aur_enabled") {
            missing.push_str("# Include AUR packages in the catalog and search\n");
            missing.push_str("aur_enabled = true\n");
        }
        if missing.is_empty() {
            return;
        }
        let mut out = content.to_string();
        if !out.is_empty() && !out.ends_with('\n') {
            out.push('\n');
        }
        out.push_str(&missing);
        if let Err(e) = std::fs::write(path, out) {
            tracing::warn!(path = %path.display(), error = %e, "could not seed settings file");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{DEFAULT_PAGE_SIZE, Settings};

    #[test]
    /// What: Parsing applies known keys, clamps, and ignores noise
    ///
    /// - Input: Mixed-case keys, out-of-range values, comments, junk lines
    /// - Output: Clamped values for known keys, defaults elsewhere
    fn config_parse_clamps_and_ignores_noise() {
        let content = "\
# a comment
Fuzzy-Threshold = 1.7
page_size = 0
aur_enabled = off
junk line
unknown_key = 5
";
        let s = Settings::parse(content);
        assert!((s.fuzzy_threshold - 1.0).abs() < f64::EPSILON);
        assert_eq!(s.page_size, 1);
        assert!(!s.aur_enabled);
    }

    #[test]
    /// What: Empty content falls back to defaults
    ///
    /// - Input: Empty string
    /// - Output: Default settings
    fn config_parse_empty_is_default() {
        let s = Settings::parse("");
        assert_eq!(s, Settings::default());
        assert_eq!(s.page_size, DEFAULT_PAGE_SIZE);
        assert!(s.aur_enabled);
    }

    #[test]
    /// What: Missing keys get appended with commented defaults
    ///
    /// - Input: File containing only page_size
    /// - Output: File gains the other keys; existing value survives a reload
    fn config_ensure_keys_appends_missing() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("settings.conf");
        std::fs::write(&path, "page_size = 25\n").expect("seed");

        let content = std::fs::read_to_string(&path).expect("read");
        Settings::ensure_keys(&path, &content);

        let rewritten = std::fs::read_to_string(&path).expect("reread");
        assert!(rewritten.contains("page_size = 25"));
        assert!(rewritten.contains("fuzzy_threshold = 0.4"));
        assert!(rewritten.contains("aur_enabled = true"));
        let s = Settings::parse(&rewritten);
        assert_eq!(s.page_size, 25);
    }
}
