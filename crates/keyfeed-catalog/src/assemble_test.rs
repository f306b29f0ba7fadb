use std::collections::HashMap;
use std::future::Future;
use std::str::FromStr;
use std::sync::Mutex;

use serde_json::json;

use super::*;
use crate::types::FetchOutcome;

/// In-memory catalog that records which lookups were made.
#[derive(Default)]
struct StubSource {
    variants: HashMap<String, FetchOutcome>,
    products: HashMap<String, RawRecord>,
    unauthorized: bool,
    variant_calls: Mutex<Vec<String>>,
    product_calls: Mutex<Vec<String>>,
}

impl StubSource {
    fn with_variants(mut self, product_id: &str, records: Vec<RawRecord>) -> Self {
        self.variants
            .insert(product_id.to_owned(), FetchOutcome::complete(records));
        self
    }

    fn with_product(mut self, id: &str, record: RawRecord) -> Self {
        self.products.insert(id.to_owned(), record);
        self
    }

    fn variant_calls(&self) -> Vec<String> {
        self.variant_calls.lock().unwrap().clone()
    }

    fn product_calls(&self) -> Vec<String> {
        self.product_calls.lock().unwrap().clone()
    }
}

impl CatalogSource for StubSource {
    fn variants_for(
        &self,
        product_id: &str,
    ) -> impl Future<Output = Result<FetchOutcome, CatalogError>> + Send {
        self.variant_calls.lock().unwrap().push(product_id.to_owned());
        let result = if self.unauthorized {
            Err(CatalogError::Unauthorized {
                url: format!("stub://offers?filter[product_id]={product_id}"),
            })
        } else {
            Ok(self.variants.get(product_id).cloned().unwrap_or_default())
        };
        async move { result }
    }

    fn product_by_id(
        &self,
        id: &str,
    ) -> impl Future<Output = Result<Option<RawRecord>, CatalogError>> + Send {
        self.product_calls.lock().unwrap().push(id.to_owned());
        let result = Ok(self.products.get(id).cloned());
        async move { result }
    }
}

fn dec(raw: &str) -> Decimal {
    Decimal::from_str(raw).unwrap()
}

async fn assemble(source: &StubSource, products: &[RawRecord]) -> AssembledOffers {
    OfferAssembler::new(source, AssembleOptions::default())
        .assemble(products)
        .await
        .unwrap()
}

#[tokio::test]
async fn bare_product_becomes_single_available_offer() {
    let source = StubSource::default();
    let products = vec![json!({"id": 1, "name": "Lamp", "price": 100, "stock": 5})];

    let result = assemble(&source, &products).await;

    assert_eq!(result.offers.len(), 1);
    let offer = &result.offers[0];
    assert_eq!(offer.id, "1");
    assert!(offer.available());
    assert_eq!(offer.price_text(), "100.00");
    assert_eq!(offer.stock, 5);
    assert_eq!(source.variant_calls(), vec!["1"]);
}

#[tokio::test]
async fn bare_product_prefers_sku_over_id() {
    let source = StubSource::default();
    let products = vec![json!({"id": 1, "sku": "LAMP-1", "price": "10"})];

    let result = assemble(&source, &products).await;

    assert_eq!(result.offers[0].id, "LAMP-1");
    assert!(!result.offers[0].available());
}

#[tokio::test]
async fn variant_without_sku_is_dropped() {
    let source = StubSource::default();
    let products = vec![json!({
        "id": 2,
        "name": "Tee",
        "price": 300,
        "variants": [
            {"id": 21, "sku": "TEE-S", "stock": 2},
            {"id": 22, "stock": 9}
        ]
    })];

    let result = assemble(&source, &products).await;

    assert_eq!(result.offers.len(), 1);
    assert_eq!(result.offers[0].id, "TEE-S");
    assert_eq!(result.dropped_without_sku, 1);
    assert!(source.variant_calls().is_empty(), "embedded variants need no fetch");
}

#[tokio::test]
async fn empty_embedded_list_falls_back_to_fetch() {
    let source =
        StubSource::default().with_variants("4", vec![json!({"id": 41, "sku": "CUP-L", "stock": 1})]);
    let products = vec![json!({"id": 4, "name": "Cup", "variants": []})];

    let result = assemble(&source, &products).await;

    assert_eq!(source.variant_calls(), vec!["4"]);
    assert_eq!(result.offers.len(), 1);
    assert_eq!(result.offers[0].id, "CUP-L");
    assert_eq!(result.offers[0].name, "Cup");
}

#[tokio::test]
async fn variant_sku_never_falls_back_to_product() {
    let source = StubSource::default();
    let products = vec![json!({"id": 3, "sku": "PARENT", "variants": [{"id": 31, "price": 5}]})];

    let result = assemble(&source, &products).await;

    assert!(result.offers.is_empty());
    assert_eq!(result.dropped_without_sku, 1);
}

#[tokio::test]
async fn variant_values_override_product_values() {
    let source = StubSource::default().with_variants(
        "4",
        vec![json!({
            "id": 41,
            "product_id": 4,
            "sku": "MUG-BLUE",
            "price": "150.5",
            "quantity": 0,
            "color": "blue"
        })],
    );
    let products = vec![json!({
        "id": 4,
        "name": "Mug",
        "description": "Ceramic mug",
        "price": 120,
        "stock": 8,
        "category_id": 12,
        "color": "white"
    })];

    let result = assemble(&source, &products).await;

    let offer = &result.offers[0];
    assert_eq!(offer.name, "Mug");
    assert_eq!(offer.price, dec("150.5"));
    assert_eq!(offer.price_text(), "150.50");
    assert_eq!(offer.stock, 0);
    assert!(!offer.available());
    assert_eq!(offer.color.as_deref(), Some("blue"));
    assert_eq!(offer.description.as_deref(), Some("Ceramic mug"));
    assert_eq!(offer.category_id.as_deref(), Some("12"));
    assert_eq!(offer.currency_id, "UAH");
}

#[tokio::test]
async fn missing_variant_stock_falls_back_to_product() {
    let source = StubSource::default();
    let products = vec![json!({"id": 5, "stock": 4, "variants": [{"sku": "V"}]})];

    let result = assemble(&source, &products).await;

    assert_eq!(result.offers[0].stock, 4);
}

#[tokio::test]
async fn old_price_only_when_greater_than_price() {
    let source = StubSource::default();
    let products = vec![json!({
        "id": 6,
        "variants": [
            {"sku": "A", "price": 100, "old_price": 120},
            {"sku": "B", "price": 100, "old_price": 100},
            {"sku": "C", "price": 100, "old_price": 80}
        ]
    })];

    let result = assemble(&source, &products).await;

    let old: Vec<Option<String>> = result.offers.iter().map(Offer::old_price_text).collect();
    assert_eq!(old, vec![Some("120.00".to_owned()), None, None]);
}

#[tokio::test]
async fn old_price_equal_after_rounding_is_dropped() {
    let source = StubSource::default();
    let products = vec![json!({
        "id": 60,
        "variants": [
            {"sku": "A", "price": "99.999", "old_price": "100.001", "stock": 1},
            {"sku": "B", "price": "99.994", "old_price": "99.996", "stock": 1}
        ]
    })];

    let result = assemble(&source, &products).await;

    let a = &result.offers[0];
    assert_eq!(a.price_text(), "100.00");
    assert_eq!(a.old_price, None);
    let b = &result.offers[1];
    assert_eq!(b.price_text(), "99.99");
    assert_eq!(b.old_price_text().as_deref(), Some("100.00"));
}

#[tokio::test]
async fn custom_color_field_feeds_color_not_params() {
    let source = StubSource::default();
    let products = vec![json!({
        "id": 7,
        "name": "Dress",
        "variants": [{
            "sku": "DRESS-RED",
            "custom_fields": [
                {"name": "Колір", "value": "red"},
                {"name": "Тканина", "value": "льон"}
            ]
        }]
    })];

    let result = assemble(&source, &products).await;

    let offer = &result.offers[0];
    assert_eq!(offer.color.as_deref(), Some("red"));
    assert!(offer.params.iter().all(|p| p.name != "Колір"));
    assert!(offer.params.iter().any(|p| p.name == "Тканина" && p.value == "льон"));
}

#[tokio::test]
async fn params_merge_product_and_dimensions() {
    let source = StubSource::default();
    let products = vec![json!({
        "id": 8,
        "weight": 0.5,
        "unit_type": "шт",
        "custom_fields": [
            {"name": "Бренд", "value": "Acme"},
            {"name": "Країна", "value": "UA"}
        ],
        "variants": [{
            "sku": "X",
            "length": 30,
            "custom_fields": [{"name": "Країна", "value": "PL"}]
        }]
    })];

    let result = assemble(&source, &products).await;

    let params: Vec<(&str, &str)> = result.offers[0]
        .params
        .iter()
        .map(|p| (p.name.as_str(), p.value.as_str()))
        .collect();
    assert_eq!(
        params,
        vec![
            ("Країна", "PL"),
            ("Бренд", "Acme"),
            ("Вага", "0.5"),
            ("Довжина", "30"),
            ("Одиниця", "шт"),
        ]
    );
}

#[tokio::test]
async fn image_fallback_and_union_modes() {
    let products = vec![json!({
        "id": 9,
        "images": ["p1", "p2"],
        "variants": [
            {"sku": "WITH", "images": [{"url": "v1"}, "p1"]},
            {"sku": "WITHOUT"}
        ]
    })];
    let source = StubSource::default();

    let fallback = assemble(&source, &products).await;
    assert_eq!(fallback.offers[0].pictures, vec!["v1", "p1"]);
    assert_eq!(fallback.offers[1].pictures, vec!["p1", "p2"]);

    let options = AssembleOptions {
        image_mode: ImageMode::Union,
        ..AssembleOptions::default()
    };
    let union = OfferAssembler::new(&source, options)
        .assemble(&products)
        .await
        .unwrap();
    assert_eq!(union.offers[0].pictures, vec!["v1", "p1", "p2"]);
}

#[tokio::test]
async fn duplicate_skus_keep_first_offer() {
    let source = StubSource::default();
    let products = vec![
        json!({"id": 10, "variants": [{"sku": "DUP", "price": 1}]}),
        json!({"id": 11, "variants": [{"sku": "DUP", "price": 2}, {"sku": "UNIQUE"}]}),
    ];

    let result = assemble(&source, &products).await;

    let ids: Vec<&str> = result.offers.iter().map(|o| o.id.as_str()).collect();
    assert_eq!(ids, vec!["DUP", "UNIQUE"]);
    assert_eq!(result.offers[0].price, dec("1"));
    assert_eq!(result.duplicate_skus, 1);
}

#[tokio::test]
async fn foreign_parent_is_fetched_once_and_cached() {
    let source = StubSource::default().with_product(
        "99",
        json!({"data": {"id": 99, "attributes": {"name": "Parent", "description": "From parent"}}}),
    );
    let products = vec![json!({
        "id": 12,
        "name": "Listed",
        "variants": [
            {"sku": "A", "product_id": 99},
            {"sku": "B", "product_id": 99}
        ]
    })];

    let mut assembler = OfferAssembler::new(&source, AssembleOptions::default());
    let result = assembler.assemble(&products).await.unwrap();

    assert_eq!(result.offers[0].name, "Parent");
    assert_eq!(result.offers[1].description.as_deref(), Some("From parent"));
    assert_eq!(source.product_calls(), vec!["99"]);
    assert!(assembler.cache().contains("99"));
}

#[tokio::test]
async fn parent_in_product_list_needs_no_fetch() {
    let source = StubSource::default();
    let products = vec![
        json!({"id": 13, "name": "Thirteen"}),
        json!({"id": 14, "variants": [{"sku": "S", "product_id": 13}]}),
    ];

    let result = assemble(&source, &products).await;

    assert_eq!(result.offers[1].name, "Thirteen");
    assert!(source.product_calls().is_empty());
}

#[tokio::test]
async fn missing_parent_falls_back_to_current_product() {
    let source = StubSource::default();
    let products = vec![json!({
        "id": 15,
        "name": "Current",
        "variants": [{"sku": "A", "product_id": 404}, {"sku": "B", "product_id": 404}]
    })];

    let result = assemble(&source, &products).await;

    assert_eq!(result.offers[0].name, "Current");
    assert_eq!(source.product_calls(), vec!["404"]);
    assert!(!result.partial);
}

#[tokio::test]
async fn stock_levels_override_record_stock() {
    let source = StubSource::default();
    let products = vec![json!({
        "id": 16,
        "variants": [
            {"id": 161, "sku": "A", "stock": 0},
            {"id": 162, "sku": "B", "stock": 3}
        ]
    })];
    let levels = StockLevels::from_records(&[
        json!({"id": 161, "quantity": 7}),
        json!({"sku": "B", "quantity": 0}),
    ]);

    let result = OfferAssembler::new(&source, AssembleOptions::default())
        .with_stock_levels(levels)
        .assemble(&products)
        .await
        .unwrap();

    assert_eq!(result.offers[0].stock, 7);
    assert!(result.offers[0].available());
    assert_eq!(result.offers[1].stock, 0);
    assert!(!result.offers[1].available());
}

#[tokio::test]
async fn partial_variant_fetch_marks_result_partial() {
    let mut source = StubSource::default();
    source.variants.insert(
        "17".to_owned(),
        FetchOutcome {
            records: vec![json!({"sku": "P1"})],
            partial: true,
        },
    );
    let products = vec![json!({"id": 17})];

    let result = assemble(&source, &products).await;

    assert!(result.partial);
    assert_eq!(result.offers.len(), 1);
}

#[tokio::test]
async fn unauthorized_variant_fetch_aborts() {
    let source = StubSource {
        unauthorized: true,
        ..StubSource::default()
    };
    let products = vec![json!({"id": 18})];

    let err = OfferAssembler::new(&source, AssembleOptions::default())
        .assemble(&products)
        .await
        .unwrap_err();

    assert!(matches!(err, CatalogError::Unauthorized { .. }));
}

#[tokio::test]
async fn every_offer_has_sku_and_consistent_availability() {
    let source = StubSource::default();
    let products = vec![
        json!({"id": 19, "stock": -3}),
        json!({"id": 20, "variants": [{"sku": "A", "stock": "2"}, {"stock": 1}, {"sku": " ", "stock": 1}]}),
    ];

    let result = assemble(&source, &products).await;

    assert_eq!(result.offers.len(), 2);
    for offer in &result.offers {
        assert!(!offer.id.is_empty());
        assert_eq!(offer.available(), offer.stock > 0);
    }
    assert_eq!(result.dropped_without_sku, 2);
}
