//! Pagination cursor arithmetic over ranked results.
//!
//! Pure index math: the session owns the cursor position, the view layer
//! owns the rendered rows. Page 0 always replaces everything rendered;
//! later pages are appended chunks.

use std::ops::Range;

/// What: Whether results exist past the given page.
///
/// Inputs:
/// - `len`: Total ranked results
/// - `page_index`: Zero-based page
/// - `page_size`: Rows per page (>= 1)
///
/// Output:
/// - `true` when `(page_index + 1) * page_size < len`
#[must_use]
pub fn has_more(len: usize, page_index: usize, page_size: usize) -> bool {
    (page_index + 1).saturating_mul(page_size) < len
}

/// What: The chunk to append when advancing to `page_index`.
///
/// Inputs:
/// - `len`, `page_index`, `page_size`: As for [`has_more`]
///
/// Output:
/// - `ranked[page_index * size .. (page_index + 1) * size]` clamped to `len`
#[must_use]
pub fn append_range(len: usize, page_index: usize, page_size: usize) -> Range<usize> {
    let start = page_index.saturating_mul(page_size).min(len);
    let end = (page_index + 1).saturating_mul(page_size).min(len);
    start..end
}

/// What: Everything rendered through `page_index` when drawing from scratch.
///
/// Inputs:
/// - `len`, `page_index`, `page_size`: As for [`has_more`]
///
/// Output:
/// - `ranked[0 .. (page_index + 1) * size]` clamped to `len`
#[must_use]
pub fn cumulative_range(len: usize, page_index: usize, page_size: usize) -> Range<usize> {
    0..(page_index + 1).saturating_mul(page_size).min(len)
}
