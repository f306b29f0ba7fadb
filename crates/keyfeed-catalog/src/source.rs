use std::future::Future;

use crate::client::CatalogClient;
use crate::error::CatalogError;
use crate::types::{FetchOutcome, RawRecord};

/// The lookups the offer assembler needs while walking the product list.
///
/// [`CatalogClient`] is the production implementation; tests substitute an
/// in-memory catalog.
pub trait CatalogSource {
    /// Variants (offers) of one product.
    fn variants_for(
        &self,
        product_id: &str,
    ) -> impl Future<Output = Result<FetchOutcome, CatalogError>> + Send;

    /// A single product by id; `Ok(None)` when it does not exist.
    fn product_by_id(
        &self,
        id: &str,
    ) -> impl Future<Output = Result<Option<RawRecord>, CatalogError>> + Send;
}

impl CatalogSource for CatalogClient {
    fn variants_for(
        &self,
        product_id: &str,
    ) -> impl Future<Output = Result<FetchOutcome, CatalogError>> + Send {
        self.fetch_variants(product_id)
    }

    fn product_by_id(
        &self,
        id: &str,
    ) -> impl Future<Output = Result<Option<RawRecord>, CatalogError>> + Send {
        self.fetch_one("products", id)
    }
}
