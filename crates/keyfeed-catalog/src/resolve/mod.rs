//! Attribute resolution across heterogeneous upstream record shapes.
//!
//! A record is first reduced to a layered [`RecordView`]: the nested
//! `attributes` object (or `data.attributes`), then the `data` object, then
//! the record root. For each [`FieldKind`] the candidate keys from the
//! resolution table are tried in order and the first present value wins.
//!
//! Every function here is pure: resolving the same record for the same
//! field always yields the same result.

mod coerce;
mod custom;
mod images;
mod table;

use keyfeed_core::OfferParam;
use rust_decimal::Decimal;
use serde_json::{Map, Value};

pub use coerce::{decimal, stock, text};
pub use images::{combine as combine_images, images};
pub use table::FieldKind;

use table::{COLOR_SYNONYMS, SIZE_SYNONYMS};

/// Lookup layers over one raw record, highest precedence first.
#[derive(Debug, Clone, Copy)]
pub struct RecordView<'a> {
    layers: [Option<&'a Map<String, Value>>; 3],
}

impl<'a> RecordView<'a> {
    /// First present value for `path` across the layers. Dotted paths
    /// descend into nested objects.
    #[must_use]
    pub fn get(&self, path: &str) -> Option<&'a Value> {
        self.layers
            .iter()
            .flatten()
            .find_map(|map| lookup_path(map, path))
    }
}

/// Builds the layered view for `record`.
#[must_use]
pub fn view(record: &Value) -> RecordView<'_> {
    let data = record.get("data").and_then(Value::as_object);
    let attributes = record
        .get("attributes")
        .and_then(Value::as_object)
        .or_else(|| data.and_then(|d| d.get("attributes")).and_then(Value::as_object));
    RecordView {
        layers: [attributes, data, record.as_object()],
    }
}

fn lookup_path<'a>(map: &'a Map<String, Value>, path: &str) -> Option<&'a Value> {
    let mut parts = path.split('.');
    let mut current = map.get(parts.next()?)?;
    for part in parts {
        current = current.get(part)?;
    }
    Some(current).filter(|v| is_present(v))
}

/// Null, blank strings and empty lists count as absent.
pub(crate) fn is_present(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::String(s) => !s.trim().is_empty(),
        Value::Array(items) => !items.is_empty(),
        _ => true,
    }
}

/// Resolves the raw value of `kind` on `record`.
///
/// Color and size fall back to the record's custom-field list when no
/// direct attribute matches.
#[must_use]
pub fn resolve(record: &Value, kind: FieldKind) -> Option<&Value> {
    let view = view(record);
    let direct = kind.candidates().iter().find_map(|key| view.get(key));
    direct.or_else(|| match kind {
        FieldKind::Color => custom::find_by_synonym(record, COLOR_SYNONYMS),
        FieldKind::Size => custom::find_by_synonym(record, SIZE_SYNONYMS),
        _ => None,
    })
}

/// Resolves `kind` as trimmed text.
#[must_use]
pub fn resolve_text(record: &Value, kind: FieldKind) -> Option<String> {
    resolve(record, kind).and_then(text)
}

/// Resolves `kind` as a non-negative decimal.
#[must_use]
pub fn resolve_decimal(record: &Value, kind: FieldKind) -> Option<Decimal> {
    resolve(record, kind).and_then(decimal)
}

/// Custom fields as generic params, minus the ones that name a color or a
/// size (those are emitted through dedicated elements).
#[must_use]
pub fn custom_params(record: &Value) -> Vec<OfferParam> {
    custom::params_excluding(record, &[COLOR_SYNONYMS, SIZE_SYNONYMS])
}

/// The normalized view of one product or variant record.
///
/// `None` means "not present on this record", which lets the assembler fall
/// back to the parent product's value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolvedFields {
    pub id: Option<String>,
    pub product_id: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<Decimal>,
    pub old_price: Option<Decimal>,
    pub stock: Option<u64>,
    pub sku: Option<String>,
    pub barcode: Option<String>,
    pub unit: Option<String>,
    pub weight: Option<String>,
    pub length: Option<String>,
    pub width: Option<String>,
    pub height: Option<String>,
    pub category_id: Option<String>,
    pub color: Option<String>,
    pub size: Option<String>,
    pub images: Vec<String>,
    pub params: Vec<OfferParam>,
}

impl ResolvedFields {
    #[must_use]
    pub fn from_record(record: &Value) -> Self {
        Self {
            id: resolve_text(record, FieldKind::Id),
            product_id: resolve_text(record, FieldKind::ProductId),
            name: resolve_text(record, FieldKind::Name),
            description: resolve_text(record, FieldKind::Description),
            price: resolve_decimal(record, FieldKind::Price),
            old_price: resolve_decimal(record, FieldKind::OldPrice),
            stock: resolve(record, FieldKind::Stock).and_then(stock),
            sku: resolve_text(record, FieldKind::Sku),
            barcode: resolve_text(record, FieldKind::Barcode),
            unit: resolve_text(record, FieldKind::Unit),
            weight: resolve_text(record, FieldKind::Weight),
            length: resolve_text(record, FieldKind::Length),
            width: resolve_text(record, FieldKind::Width),
            height: resolve_text(record, FieldKind::Height),
            category_id: resolve_text(record, FieldKind::CategoryId),
            color: resolve_text(record, FieldKind::Color),
            size: resolve_text(record, FieldKind::Size),
            images: images(record),
            params: custom_params(record),
        }
    }
}

#[cfg(test)]
#[path = "../resolve_test.rs"]
mod tests;
