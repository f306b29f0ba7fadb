//! Supplementary lookups: stock levels and the category tree.

use std::collections::HashMap;

use keyfeed_core::Category;

use crate::resolve::{resolve, resolve_text, stock, FieldKind};
use crate::types::RawRecord;

/// Stock quantities from the `/offers/stocks` collection, indexed by offer
/// id and by SKU.
#[derive(Debug, Default, Clone)]
pub struct StockLevels {
    by_id: HashMap<String, u64>,
    by_sku: HashMap<String, u64>,
}

impl StockLevels {
    #[must_use]
    pub fn from_records(records: &[RawRecord]) -> Self {
        let mut levels = Self::default();
        for record in records {
            let Some(quantity) = resolve(record, FieldKind::Stock).and_then(stock) else {
                continue;
            };
            if let Some(id) = resolve_text(record, FieldKind::Id) {
                levels.by_id.entry(id).or_insert(quantity);
            }
            if let Some(sku) = resolve_text(record, FieldKind::Sku) {
                levels.by_sku.entry(sku).or_insert(quantity);
            }
        }
        levels
    }

    /// Quantity for an offer, looked up by id first and SKU second.
    #[must_use]
    pub fn quantity(&self, id: Option<&str>, sku: Option<&str>) -> Option<u64> {
        id.and_then(|id| self.by_id.get(id))
            .or_else(|| sku.and_then(|sku| self.by_sku.get(sku)))
            .copied()
    }
}

/// Converts raw category records into feed categories, skipping entries
/// without an id or a name.
#[must_use]
pub fn categories_from_records(records: &[RawRecord]) -> Vec<Category> {
    let mut seen = std::collections::HashSet::new();
    records
        .iter()
        .filter_map(|record| {
            let id = resolve_text(record, FieldKind::Id)?;
            let name = resolve_text(record, FieldKind::Name)?;
            let parent_id = resolve_text(record, FieldKind::ParentId)
                .filter(|parent| parent != &id && parent != "0");
            Some(Category {
                id,
                parent_id,
                name,
            })
        })
        .filter(|category| seen.insert(category.id.clone()))
        .collect()
}
