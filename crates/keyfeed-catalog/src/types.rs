//! Raw upstream shapes.
//!
//! Records are kept as untyped [`serde_json::Value`]s: the upstream API
//! nests attributes differently across revisions (`attributes`,
//! `data.attributes`, or inline) and renames keys between locales, so a
//! fixed `Deserialize` struct would silently drop data. All field access
//! goes through [`crate::resolve`].
//!
//! ### Page envelope
//! List endpoints answer with `{ "data": [...], "meta": {...} }`. Some
//! revisions return a bare JSON array instead; both are accepted.

use serde_json::Value;

/// One product, variant, stock row or category exactly as returned upstream.
pub type RawRecord = Value;

/// Result of paging through one upstream collection.
#[derive(Debug, Default, Clone)]
pub struct FetchOutcome {
    pub records: Vec<RawRecord>,
    /// `true` when pagination stopped early because a page could not be
    /// fetched or the page cap was reached. The records collected before
    /// that point are still returned.
    pub partial: bool,
}

impl FetchOutcome {
    #[must_use]
    pub fn complete(records: Vec<RawRecord>) -> Self {
        Self {
            records,
            partial: false,
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Pulls the record list out of a page body.
///
/// Returns `None` when the body has neither a `data` array nor a top-level
/// array, which callers treat as a malformed page.
#[must_use]
pub fn page_records(body: &Value) -> Option<&Vec<Value>> {
    match body {
        Value::Array(items) => Some(items),
        Value::Object(map) => map.get("data").and_then(Value::as_array),
        _ => None,
    }
}

/// Takes ownership of the record list in a page body. Bodies without a
/// record list yield an empty list.
#[must_use]
pub fn into_page_records(body: Value) -> Vec<RawRecord> {
    match body {
        Value::Array(items) => items,
        Value::Object(mut map) => match map.remove("data") {
            Some(Value::Array(items)) => items,
            _ => Vec::new(),
        },
        _ => Vec::new(),
    }
}

/// Unwraps a single-record response, which may or may not carry a `data`
/// envelope.
#[must_use]
pub fn single_record(body: Value) -> Option<RawRecord> {
    match body {
        Value::Object(mut map) => match map.remove("data") {
            Some(inner @ Value::Object(_)) => Some(inner),
            Some(other) => {
                map.insert("data".to_owned(), other);
                Some(Value::Object(map))
            }
            None => Some(Value::Object(map)),
        },
        _ => None,
    }
}
