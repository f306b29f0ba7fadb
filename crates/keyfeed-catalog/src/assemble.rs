//! Turns raw product records into feed offers.
//!
//! Each product contributes either one offer per variant that carries its
//! own SKU, or, when it has no variants at all, a single offer built from
//! the product itself. Variant values override product values field by
//! field; the SKU never falls back to the product.

use std::collections::HashSet;

use keyfeed_core::{round_money, AppConfig, ImageMode, Offer, OfferParam};
use rust_decimal::Decimal;
use serde_json::Value;

use crate::cache::ProductCache;
use crate::error::CatalogError;
use crate::lookups::StockLevels;
use crate::resolve::{combine_images, view, ResolvedFields};
use crate::source::CatalogSource;
use crate::types::RawRecord;

/// Keys under which a product may embed its variant list.
const EMBEDDED_VARIANT_KEYS: &[&str] = &["variants", "offers"];

/// Param names for dimensions and unit, in emission order.
const WEIGHT_PARAM: &str = "Вага";
const LENGTH_PARAM: &str = "Довжина";
const WIDTH_PARAM: &str = "Ширина";
const HEIGHT_PARAM: &str = "Висота";
const UNIT_PARAM: &str = "Одиниця";

#[derive(Debug, Clone)]
pub struct AssembleOptions {
    pub image_mode: ImageMode,
    pub currency_id: String,
}

impl AssembleOptions {
    #[must_use]
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            image_mode: config.image_mode,
            currency_id: config.currency_id.clone(),
        }
    }
}

impl Default for AssembleOptions {
    fn default() -> Self {
        Self {
            image_mode: ImageMode::default(),
            currency_id: "UAH".to_owned(),
        }
    }
}

#[derive(Debug, Default)]
pub struct AssembledOffers {
    pub offers: Vec<Offer>,
    /// Some variant list or parent product could not be fetched.
    pub partial: bool,
    /// Records skipped because they had no SKU of their own.
    pub dropped_without_sku: usize,
    /// Offers skipped because an earlier offer already used the SKU.
    pub duplicate_skus: usize,
}

/// Per-run offer assembly.
///
/// Owns the run's [`ProductCache`]; create one assembler per generation run.
pub struct OfferAssembler<'a, S> {
    source: &'a S,
    options: AssembleOptions,
    cache: ProductCache,
    missing_products: HashSet<String>,
    stock_levels: Option<StockLevels>,
}

impl<'a, S: CatalogSource + Sync> OfferAssembler<'a, S> {
    #[must_use]
    pub fn new(source: &'a S, options: AssembleOptions) -> Self {
        Self {
            source,
            options,
            cache: ProductCache::new(),
            missing_products: HashSet::new(),
            stock_levels: None,
        }
    }

    /// Quantities from the stock collection replace per-record stock values.
    #[must_use]
    pub fn with_stock_levels(mut self, levels: StockLevels) -> Self {
        self.stock_levels = Some(levels);
        self
    }

    #[must_use]
    pub fn cache(&self) -> &ProductCache {
        &self.cache
    }

    /// Builds offers for `products` in upstream order.
    ///
    /// # Errors
    ///
    /// Returns a fatal [`CatalogError`] (401, bad base URL) raised while
    /// fetching variants or parent products. Every other failure is logged
    /// and reflected in [`AssembledOffers::partial`].
    pub async fn assemble(
        &mut self,
        products: &[RawRecord],
    ) -> Result<AssembledOffers, CatalogError> {
        self.cache.extend_from(products);

        let mut out = AssembledOffers::default();
        let mut seen_skus: HashSet<String> = HashSet::new();

        for product in products {
            let product_fields = ResolvedFields::from_record(product);
            let candidates = self.offers_for_product(product, &product_fields, &mut out).await?;

            for offer in candidates {
                if seen_skus.insert(offer.id.clone()) {
                    out.offers.push(offer);
                } else {
                    tracing::warn!(sku = %offer.id, "duplicate SKU, keeping the first offer");
                    out.duplicate_skus += 1;
                }
            }
        }

        tracing::info!(
            products = products.len(),
            offers = out.offers.len(),
            dropped_without_sku = out.dropped_without_sku,
            duplicate_skus = out.duplicate_skus,
            partial = out.partial,
            "offers assembled"
        );
        Ok(out)
    }

    async fn offers_for_product(
        &mut self,
        product: &RawRecord,
        product_fields: &ResolvedFields,
        out: &mut AssembledOffers,
    ) -> Result<Vec<Offer>, CatalogError> {
        let fetched;
        let variants: &[RawRecord] = if let Some(embedded) = embedded_variants(product) {
            embedded
        } else if let Some(product_id) = product_fields.id.as_deref() {
            fetched = self.fetch_variants(product_id, out).await?;
            &fetched
        } else {
            &[]
        };

        if variants.is_empty() {
            let Some(id) = product_fields
                .sku
                .clone()
                .or_else(|| product_fields.id.clone())
            else {
                out.dropped_without_sku += 1;
                return Ok(Vec::new());
            };
            return Ok(vec![self.build_offer(id, product_fields, None)]);
        }

        let mut offers = Vec::with_capacity(variants.len());
        for variant in variants {
            let variant_fields = ResolvedFields::from_record(variant);
            let Some(sku) = variant_fields.sku.clone() else {
                tracing::debug!(
                    variant_id = variant_fields.id.as_deref().unwrap_or("?"),
                    "variant without SKU dropped"
                );
                out.dropped_without_sku += 1;
                continue;
            };

            let foreign_parent = variant_fields
                .product_id
                .as_deref()
                .filter(|pid| product_fields.id.as_deref() != Some(*pid));
            let parent = match foreign_parent {
                Some(pid) => self.parent_fields(pid, out).await?,
                None => None,
            };
            let parent = parent.as_ref().unwrap_or(product_fields);

            offers.push(self.build_offer(sku, &variant_fields, Some(parent)));
        }
        Ok(offers)
    }

    async fn fetch_variants(
        &self,
        product_id: &str,
        out: &mut AssembledOffers,
    ) -> Result<Vec<RawRecord>, CatalogError> {
        match self.source.variants_for(product_id).await {
            Ok(outcome) => {
                if outcome.partial {
                    out.partial = true;
                }
                Ok(outcome.records)
            }
            Err(err) if err.is_fatal() => Err(err),
            Err(err) => {
                tracing::warn!(product_id, error = %err, "variant fetch failed, treating product as bare");
                out.partial = true;
                Ok(Vec::new())
            }
        }
    }

    /// Resolved fields of a parent product, from the run cache or fetched
    /// once on a miss. `None` when the parent cannot be found.
    async fn parent_fields(
        &mut self,
        product_id: &str,
        out: &mut AssembledOffers,
    ) -> Result<Option<ResolvedFields>, CatalogError> {
        if let Some(record) = self.cache.get(product_id) {
            return Ok(Some(ResolvedFields::from_record(record)));
        }
        if self.missing_products.contains(product_id) {
            return Ok(None);
        }

        match self.source.product_by_id(product_id).await {
            Ok(Some(record)) => {
                let fields = ResolvedFields::from_record(&record);
                self.cache.insert(product_id.to_owned(), record);
                Ok(Some(fields))
            }
            Ok(None) => {
                tracing::warn!(product_id, "parent product not found");
                self.missing_products.insert(product_id.to_owned());
                Ok(None)
            }
            Err(err) if err.is_fatal() => Err(err),
            Err(err) => {
                tracing::warn!(product_id, error = %err, "parent product fetch failed");
                self.missing_products.insert(product_id.to_owned());
                out.partial = true;
                Ok(None)
            }
        }
    }

    /// Merges `own` over `parent` into one offer keyed by `id`.
    fn build_offer(&self, id: String, own: &ResolvedFields, parent: Option<&ResolvedFields>) -> Offer {
        // The stock collection is keyed by variant id; bare products are
        // matched by SKU only.
        let stock_key = parent.and(own.id.as_deref());
        let fallback = ResolvedFields::default();
        let parent = parent.unwrap_or(&fallback);

        // Compared at feed precision so the rendered old price is always
        // strictly above the rendered price.
        let price = round_money(own.price.or(parent.price).unwrap_or(Decimal::ZERO));
        let old_price = own
            .old_price
            .or(parent.old_price)
            .map(round_money)
            .filter(|old| *old > price);

        let stock = self
            .stock_levels
            .as_ref()
            .and_then(|levels| levels.quantity(stock_key, Some(id.as_str())))
            .or(own.stock)
            .or(parent.stock)
            .unwrap_or(0);

        let pick = |mine: &Option<String>, theirs: &Option<String>| {
            mine.clone().or_else(|| theirs.clone())
        };

        Offer {
            name: pick(&own.name, &parent.name).unwrap_or_else(|| id.clone()),
            price,
            old_price,
            currency_id: self.options.currency_id.clone(),
            stock,
            description: pick(&own.description, &parent.description),
            barcode: pick(&own.barcode, &parent.barcode),
            category_id: pick(&own.category_id, &parent.category_id),
            color: pick(&own.color, &parent.color),
            size: pick(&own.size, &parent.size),
            params: merge_params(own, parent),
            pictures: combine_images(&own.images, &parent.images, self.options.image_mode),
            id,
        }
    }
}

/// A non-empty inline variant list, if the product carries one.
fn embedded_variants(product: &RawRecord) -> Option<&[RawRecord]> {
    let view = view(product);
    EMBEDDED_VARIANT_KEYS
        .iter()
        .find_map(|key| {
            view.get(key)
                .and_then(Value::as_array)
                .filter(|variants| !variants.is_empty())
        })
        .map(Vec::as_slice)
}

/// Custom params of the record, then the parent's params it does not
/// override, then dimensions and unit.
fn merge_params(own: &ResolvedFields, parent: &ResolvedFields) -> Vec<OfferParam> {
    let mut params: Vec<OfferParam> = Vec::new();
    let mut push = |name: &str, value: String| {
        if !params.iter().any(|p| p.name == name) {
            params.push(OfferParam {
                name: name.to_owned(),
                value,
            });
        }
    };

    for param in own.params.iter().chain(&parent.params) {
        push(&param.name, param.value.clone());
    }

    let dimensions = [
        (WEIGHT_PARAM, &own.weight, &parent.weight),
        (LENGTH_PARAM, &own.length, &parent.length),
        (WIDTH_PARAM, &own.width, &parent.width),
        (HEIGHT_PARAM, &own.height, &parent.height),
        (UNIT_PARAM, &own.unit, &parent.unit),
    ];
    for (name, mine, theirs) in dimensions {
        if let Some(value) = mine.clone().or_else(|| theirs.clone()) {
            push(name, value);
        }
    }

    params
}

#[cfg(test)]
#[path = "assemble_test.rs"]
mod tests;
