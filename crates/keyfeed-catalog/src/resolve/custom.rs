//! Custom-field lists and the color/size secondary lookup.
//!
//! Upstream records carry free-form attributes as a list of
//! `{ "name": ..., "value": ... }` entries (or, in older revisions, a plain
//! `name -> value` object). Color and size are often only present here,
//! named in the merchant's language.

use keyfeed_core::OfferParam;
use serde_json::Value;

use super::coerce;
use super::table::{
    CUSTOM_FIELD_LISTS, CUSTOM_FIELD_NAME_KEYS, CUSTOM_FIELD_VALUE_KEYS,
};
use super::{is_present, view};

/// Every custom field on the record as `(name, raw value)` pairs, in
/// upstream order. Entries without a usable name are skipped.
pub(crate) fn raw_custom_fields(record: &Value) -> Vec<(String, &Value)> {
    let view = view(record);
    let mut fields = Vec::new();

    for list_key in CUSTOM_FIELD_LISTS {
        let Some(list) = view.get(list_key) else {
            continue;
        };
        match list {
            Value::Array(entries) => {
                for entry in entries {
                    let name = CUSTOM_FIELD_NAME_KEYS
                        .iter()
                        .find_map(|k| entry.get(*k).and_then(coerce::text));
                    let value = CUSTOM_FIELD_VALUE_KEYS
                        .iter()
                        .find_map(|k| entry.get(*k).filter(|v| is_present(v)));
                    if let (Some(name), Some(value)) = (name, value) {
                        fields.push((name, value));
                    }
                }
            }
            Value::Object(map) => {
                for (name, value) in map {
                    if let Some(name) = coerce::clean_text(name).filter(|_| is_present(value)) {
                        fields.push((name, value));
                    }
                }
            }
            _ => {}
        }
    }

    fields
}

/// `true` when `name` contains any of `synonyms`, ignoring case.
pub(crate) fn matches_synonym(name: &str, synonyms: &[&str]) -> bool {
    let lower = name.to_lowercase();
    synonyms.iter().any(|s| lower.contains(s))
}

/// Value of the first custom field whose name matches `synonyms`.
pub(crate) fn find_by_synonym<'a>(record: &'a Value, synonyms: &[&str]) -> Option<&'a Value> {
    raw_custom_fields(record)
        .into_iter()
        .find(|(name, _)| matches_synonym(name, synonyms))
        .map(|(_, value)| value)
}

/// Custom fields as generic params, excluding the ones that map to a
/// dedicated element (`excluded` synonym sets).
pub(crate) fn params_excluding(record: &Value, excluded: &[&[&str]]) -> Vec<OfferParam> {
    raw_custom_fields(record)
        .into_iter()
        .filter(|(name, _)| !excluded.iter().any(|syn| matches_synonym(name, syn)))
        .filter_map(|(name, value)| coerce::text(value).map(|value| OfferParam { name, value }))
        .collect()
}
