//! State types for the catalog engine.

/// Core value types (records, views, pages).
pub mod types;

pub use types::{Page, PackageRecord, RankedMatch, SourceKind, SummaryCounts, View, ViewState};
