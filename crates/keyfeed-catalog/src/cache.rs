use std::collections::HashMap;

use crate::resolve::{resolve_text, FieldKind};
use crate::types::RawRecord;

/// Product records seen during one generation run, keyed by product id.
///
/// Created with the run and dropped with it; never shared between runs.
#[derive(Debug, Default)]
pub struct ProductCache {
    records: HashMap<String, RawRecord>,
}

impl ProductCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds the cache from an already-fetched product page. Records
    /// without a resolvable id are skipped.
    pub fn extend_from(&mut self, products: &[RawRecord]) {
        for product in products {
            if let Some(id) = resolve_text(product, FieldKind::Id) {
                self.records.entry(id).or_insert_with(|| product.clone());
            }
        }
    }

    pub fn insert(&mut self, id: String, record: RawRecord) {
        self.records.insert(id, record);
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&RawRecord> {
        self.records.get(id)
    }

    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.records.contains_key(id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
