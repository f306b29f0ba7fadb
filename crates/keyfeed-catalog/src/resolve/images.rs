use std::collections::HashSet;

use keyfeed_core::ImageMode;
use serde_json::Value;

use super::coerce::clean_text;
use super::table::{FieldKind, IMAGE_URL_KEYS};
use super::view;

/// Collects image URLs from every image-like key on the record.
///
/// Each key may hold a URL string, an object with a `url`/`src` member, or a
/// list of either. Duplicates are removed keeping the first occurrence.
#[must_use]
pub fn images(record: &Value) -> Vec<String> {
    let view = view(record);
    let mut urls = Vec::new();
    for key in FieldKind::Images.candidates() {
        if let Some(value) = view.get(key) {
            collect_urls(value, &mut urls);
        }
    }
    dedupe(urls)
}

fn collect_urls(value: &Value, out: &mut Vec<String>) {
    match value {
        Value::String(s) => {
            if let Some(url) = clean_text(s) {
                out.push(url);
            }
        }
        Value::Array(items) => {
            for item in items {
                collect_urls(item, out);
            }
        }
        Value::Object(map) => {
            if let Some(url) = IMAGE_URL_KEYS
                .iter()
                .filter_map(|k| map.get(*k).and_then(Value::as_str))
                .find_map(clean_text)
            {
                out.push(url);
            }
        }
        _ => {}
    }
}

/// Combines variant and product images according to `mode`.
#[must_use]
pub fn combine(variant: &[String], product: &[String], mode: ImageMode) -> Vec<String> {
    match mode {
        ImageMode::Fallback if variant.is_empty() => product.to_vec(),
        ImageMode::Fallback => variant.to_vec(),
        ImageMode::Union => dedupe(variant.iter().chain(product).cloned().collect()),
    }
}

/// Removes duplicate URLs, keeping the first occurrence of each.
fn dedupe(urls: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    urls.into_iter()
        .filter(|url| seen.insert(url.clone()))
        .collect()
}
