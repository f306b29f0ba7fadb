//! Feed generation run orchestration.

use std::time::Duration;

use chrono::{DateTime, Utc};
use keyfeed_catalog::lookups::categories_from_records;
use keyfeed_catalog::{AssembleOptions, CatalogClient, OfferAssembler, StockLevels};
use keyfeed_core::{AppConfig, Category, Currency, FeedDocument, ShopMeta};

use crate::error::FeedError;
use crate::xml::serialize;

/// Everything a run needs besides the catalog client.
#[derive(Debug, Clone)]
pub struct FeedSettings {
    pub shop: ShopMeta,
    pub currency: Currency,
    pub assemble: AssembleOptions,
    pub include_categories: bool,
    pub use_stock_endpoint: bool,
}

impl FeedSettings {
    #[must_use]
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            shop: ShopMeta {
                name: config.shop_name.clone(),
                company: config.company_name.clone(),
                url: config.shop_url.clone(),
            },
            currency: Currency {
                id: config.currency_id.clone(),
                rate: config.currency_rate.clone(),
            },
            assemble: AssembleOptions::from_config(config),
            include_categories: config.include_categories,
            use_stock_endpoint: config.use_stock_endpoint,
        }
    }
}

/// A rendered feed and how it was obtained.
#[derive(Debug, Clone)]
pub struct FeedOutput {
    pub xml: Vec<u8>,
    pub offer_count: usize,
    /// Some product pages or variant lists could not be fetched; the feed
    /// holds everything that could.
    pub partial: bool,
}

/// Runs one generation end to end with a client built from `config`,
/// bounded by `config.run_timeout_secs`.
///
/// # Errors
///
/// - [`FeedError::Catalog`] when the client cannot be built or upstream
///   rejects the credentials.
/// - [`FeedError::EmptyCatalog`] when upstream returns no products.
/// - [`FeedError::Timeout`] when the run exceeds its time budget.
pub async fn generate_feed(config: &AppConfig) -> Result<FeedOutput, FeedError> {
    let client = CatalogClient::from_config(config)?;
    let settings = FeedSettings::from_config(config);
    let secs = config.run_timeout_secs;

    tokio::time::timeout(
        Duration::from_secs(secs),
        generate_feed_with(&client, &settings, Utc::now()),
    )
    .await
    .map_err(|_| FeedError::Timeout { secs })?
}

/// Runs one generation against `client`, stamping the document with `now`.
///
/// 1. Fetch all products (fatal on 401, fatal when empty).
/// 2. Optionally fetch stock levels and categories.
/// 3. Assemble offers, fetching variants where products embed none.
/// 4. Serialize the document.
///
/// # Errors
///
/// See [`generate_feed`].
pub async fn generate_feed_with(
    client: &CatalogClient,
    settings: &FeedSettings,
    now: DateTime<Utc>,
) -> Result<FeedOutput, FeedError> {
    let products = client.fetch_products().await?;
    if products.is_empty() {
        return Err(FeedError::EmptyCatalog);
    }
    let mut partial = products.partial;
    tracing::info!(
        products = products.records.len(),
        partial,
        "product catalog fetched"
    );

    let stock_levels = if settings.use_stock_endpoint {
        let stocks = client.fetch_stocks().await?;
        if stocks.partial {
            tracing::warn!("stock levels incomplete, missing entries fall back to record stock");
        }
        Some(StockLevels::from_records(&stocks.records))
    } else {
        None
    };

    let categories = if settings.include_categories {
        fetch_categories(client).await?
    } else {
        None
    };

    let mut assembler = OfferAssembler::new(client, settings.assemble.clone());
    if let Some(levels) = stock_levels {
        assembler = assembler.with_stock_levels(levels);
    }
    let assembled = assembler.assemble(&products.records).await?;
    partial |= assembled.partial;

    let offer_count = assembled.offers.len();
    let doc = FeedDocument {
        generated_at: now,
        shop: settings.shop.clone(),
        currency: settings.currency.clone(),
        categories,
        offers: assembled.offers,
    };
    let xml = serialize(&doc)?;

    if partial {
        tracing::warn!(offer_count, "feed generated from a partial catalog");
    }
    tracing::info!(offer_count, bytes = xml.len(), partial, "feed generated");

    Ok(FeedOutput {
        xml,
        offer_count,
        partial,
    })
}

/// Categories for the feed; `None` when upstream has none so the block is
/// left out.
async fn fetch_categories(client: &CatalogClient) -> Result<Option<Vec<Category>>, FeedError> {
    let outcome = client.fetch_categories().await?;
    if outcome.partial {
        tracing::warn!("category list incomplete");
    }
    let categories = categories_from_records(&outcome.records);
    Ok((!categories.is_empty()).then_some(categories))
}
