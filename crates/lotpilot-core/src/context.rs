//! Parsing of caller-supplied context blobs.
//!
//! Context arrives as JSON-encoded strings embedded in flow requests
//! (bookmarks, nearby lots). All of it is untrusted: absence, malformed
//! JSON, and partially-shaped entries must degrade to an empty default with
//! a recorded warning, never an error.

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::domain::{Bookmark, NearbyLot};

/// Result of parsing one optional JSON-array context blob.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedContext {
    pub entries: Vec<Value>,
    /// False when the blob was present but could not be used as given.
    pub intact: bool,
}

impl ParsedContext {
    fn empty(intact: bool) -> Self {
        Self {
            entries: Vec::new(),
            intact,
        }
    }
}

/// Parse an optional string expected to hold a JSON array.
///
/// Absent input is an intact empty context; malformed JSON or a non-array
/// value degrades to an empty context flagged as damaged.
pub fn parse_optional_json_array(raw: Option<&str>) -> ParsedContext {
    let Some(raw) = raw else {
        return ParsedContext::empty(true);
    };

    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Array(entries)) => ParsedContext {
            entries,
            intact: true,
        },
        Ok(other) => {
            tracing::warn!(
                found = %json_type_name(&other),
                "context blob is valid JSON but not an array; ignoring"
            );
            ParsedContext::empty(false)
        }
        Err(error) => {
            tracing::warn!(%error, "context blob is not valid JSON; ignoring");
            ParsedContext::empty(false)
        }
    }
}

/// Typed slice of context entries plus the warnings produced getting there.
#[derive(Debug, Clone, PartialEq)]
pub struct ContextSlice<T> {
    pub items: Vec<T>,
    pub warnings: Vec<String>,
}

impl<T> ContextSlice<T> {
    pub fn empty() -> Self {
        Self {
            items: Vec::new(),
            warnings: Vec::new(),
        }
    }
}

/// Parse a bookmarks context blob, dropping entries without id or label.
pub fn bookmarks_from_json(raw: Option<&str>) -> ContextSlice<Bookmark> {
    typed_slice(raw, "bookmarks", |bookmark: &Bookmark| {
        !bookmark.id.trim().is_empty() && !bookmark.label.trim().is_empty()
    })
}

/// Parse a nearby-lots context blob, dropping entries without id or name.
pub fn nearby_lots_from_json(raw: Option<&str>) -> ContextSlice<NearbyLot> {
    typed_slice(raw, "nearby lots", |lot: &NearbyLot| {
        !lot.id.trim().is_empty() && !lot.name.trim().is_empty()
    })
}

fn typed_slice<T>(raw: Option<&str>, what: &str, keep: impl Fn(&T) -> bool) -> ContextSlice<T>
where
    T: DeserializeOwned,
{
    let parsed = parse_optional_json_array(raw);
    let mut warnings = Vec::new();
    if !parsed.intact {
        warnings.push(format!("{what} context was malformed and has been ignored"));
    }

    let total = parsed.entries.len();
    let items: Vec<T> = parsed
        .entries
        .into_iter()
        .filter_map(|entry| serde_json::from_value(entry).ok())
        .filter(|item| keep(item))
        .collect();

    if items.len() < total {
        let dropped = total - items.len();
        tracing::debug!(dropped, what, "dropped incomplete context entries");
        warnings.push(format!("{dropped} incomplete {what} entries were ignored"));
    }

    ContextSlice { items, warnings }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
