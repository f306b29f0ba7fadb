//! Page-termination signals for the upstream list endpoints.
//!
//! Observed API revisions disagree on how the "more pages" state is
//! reported. Any of the following may be present, nested under
//! `meta.pagination`, under `meta`, or at the top level of the body:
//!
//! ```text
//! { "meta": { "pagination": { "next_page": 3 } } }           // number, URL, bool or null
//! { "current_page": 2, "last_page": 2, "next_page_url": null }
//! { "meta": { "has_next_page": false } }
//! { "links": { "self": "...", "next": null } }                // JSON:API
//! ```
//!
//! All signals are evaluated together: pagination stops as soon as any one
//! of them reports the end, and also when a page comes back shorter than the
//! requested page size.

use serde_json::Value;

/// Decides whether another page should be requested after `page`.
///
/// `record_count` is the number of records the page contained and
/// `per_page` the page size that was requested.
#[must_use]
pub fn has_next_page(body: &Value, page: u32, record_count: usize, per_page: u32) -> bool {
    if record_count == 0 {
        return false;
    }
    if usize::try_from(per_page).is_ok_and(|per_page| record_count < per_page) {
        return false;
    }
    !metadata_signals_end(body, page)
}

/// Returns `true` when any pagination metadata in `body` says the current
/// page is the last one. Absent metadata never signals the end.
fn metadata_signals_end(body: &Value, page: u32) -> bool {
    metadata_blocks(body).any(|block| block_signals_end(block, page)) || links_signal_end(body)
}

/// JSON:API `links.next`: a missing key says nothing, an empty one ends.
fn links_signal_end(body: &Value) -> bool {
    body.get("links")
        .and_then(|links| links.get("next"))
        .is_some_and(|next| !next_indicator_present(next))
}

fn metadata_blocks(body: &Value) -> impl Iterator<Item = &Value> {
    let meta = body.get("meta");
    [
        meta.and_then(|m| m.get("pagination")),
        meta,
        body.get("pagination"),
        Some(body),
    ]
    .into_iter()
    .flatten()
    .filter(|v| v.is_object())
}

fn block_signals_end(block: &Value, page: u32) -> bool {
    if let Some(next) = block.get("next_page") {
        if !next_indicator_present(next) {
            return true;
        }
    }
    if let Some(next_url) = block.get("next_page_url") {
        if !next_indicator_present(next_url) {
            return true;
        }
    }
    for flag in ["has_next_page", "has_more"] {
        if block.get(flag).and_then(Value::as_bool) == Some(false) {
            return true;
        }
    }

    let last = block
        .get("last_page")
        .or_else(|| block.get("total_pages"))
        .and_then(as_page_number);
    if let Some(last) = last {
        let current = block
            .get("current_page")
            .and_then(as_page_number)
            .unwrap_or(u64::from(page));
        if current >= last {
            return true;
        }
    }

    false
}

/// Interprets a `next_page`-style value: `null`, `false`, `""` and `0`
/// mean "no next page"; anything else means there is one.
fn next_indicator_present(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::String(s) => !s.trim().is_empty(),
        Value::Number(n) => n.as_u64().is_some_and(|n| n > 0),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn as_page_number(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
