//! Shared field-level normalization and cross-referencing.

use lotpilot_core::Bookmark;

/// Outcome of resolving a spoken destination against saved bookmarks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BookmarkMatch {
    /// The spoken label matched a bookmark exactly.
    Exact(String),
    /// Matched ignoring case; carries the canonical label.
    CaseInsensitive(String),
    /// No bookmark matched; the spoken text stands as-is.
    None,
}

/// Resolve a spoken destination to a canonical bookmark label.
///
/// Exact match wins over case-insensitive match; within each tier the first
/// bookmark in supplied order wins when duplicates exist.
pub fn resolve_bookmark_label(spoken: &str, bookmarks: &[Bookmark]) -> BookmarkMatch {
    let spoken = spoken.trim();

    if let Some(bookmark) = bookmarks.iter().find(|b| b.label == spoken) {
        return BookmarkMatch::Exact(bookmark.label.clone());
    }

    if let Some(bookmark) = bookmarks
        .iter()
        .find(|b| b.label.eq_ignore_ascii_case(spoken))
    {
        return BookmarkMatch::CaseInsensitive(bookmark.label.clone());
    }

    BookmarkMatch::None
}

/// Pull a non-empty trimmed string field out of a JSON object.
pub fn string_field(value: &serde_json::Value, field: &str) -> Option<String> {
    value
        .get(field)
        .and_then(serde_json::Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
}

/// Pull a finite numeric field out of a JSON object.
pub fn number_field(value: &serde_json::Value, field: &str) -> Option<f64> {
    value
        .get(field)
        .and_then(serde_json::Value::as_f64)
        .filter(|n| n.is_finite())
}
