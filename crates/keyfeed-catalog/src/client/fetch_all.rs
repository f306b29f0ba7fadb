//! Multi-page collection loops and single-record lookups for `CatalogClient`.

use crate::error::CatalogError;
use crate::pagination::has_next_page;
use crate::retry::retry_with_policy;
use crate::types::{into_page_records, page_records, single_record, FetchOutcome, RawRecord};

use super::CatalogClient;

impl CatalogClient {
    /// Fetches every page of `resource`, starting at page 1.
    ///
    /// Pages are requested sequentially with `params` appended to each
    /// request. A page that still fails after the retry budget ends
    /// pagination: the records collected so far are returned with
    /// `partial = true`. Hitting the page cap while more pages remain is
    /// also reported as partial.
    ///
    /// # Errors
    ///
    /// Only fatal errors are returned: [`CatalogError::Unauthorized`] and
    /// [`CatalogError::InvalidBaseUrl`].
    pub async fn fetch_all(
        &self,
        resource: &str,
        params: &[(&str, &str)],
    ) -> Result<FetchOutcome, CatalogError> {
        let mut records: Vec<RawRecord> = Vec::new();
        let mut partial = false;
        let mut page = 1u32;

        loop {
            let body = match self.fetch_page(resource, page, params).await {
                Ok(body) => body,
                Err(err) if err.is_fatal() => return Err(err),
                Err(err) => {
                    tracing::warn!(
                        resource,
                        page,
                        error = %err,
                        "page failed after retries, keeping records fetched so far"
                    );
                    partial = true;
                    break;
                }
            };

            let count = page_records(&body).map_or(0, Vec::len);
            let more = has_next_page(&body, page, count, self.per_page);
            tracing::debug!(resource, page, count, more, "fetched page");
            records.extend(into_page_records(body));

            if !more {
                break;
            }
            if usize::try_from(page).unwrap_or(usize::MAX) >= self.max_pages {
                tracing::warn!(
                    resource,
                    max_pages = self.max_pages,
                    "page cap reached before the last page"
                );
                partial = true;
                break;
            }
            page += 1;
        }

        Ok(FetchOutcome { records, partial })
    }

    /// Fetches a single record at `{resource}/{id}`.
    ///
    /// Returns `Ok(None)` when the record does not exist (404).
    ///
    /// # Errors
    ///
    /// Returns the last error when every attempt failed, or a fatal error
    /// immediately.
    pub async fn fetch_one(
        &self,
        resource: &str,
        id: &str,
    ) -> Result<Option<RawRecord>, CatalogError> {
        let path = format!("{}/{id}", resource.trim_end_matches('/'));
        let url = self.resource_url(&path)?;
        let url = &url;
        match retry_with_policy(&self.policy, || self.request_json(url)).await {
            Ok(body) => Ok(single_record(body)),
            Err(CatalogError::NotFound { .. }) => Ok(None),
            Err(err) => Err(err),
        }
    }

    /// All products. Variants are requested inline so most products need no
    /// second round trip.
    ///
    /// # Errors
    ///
    /// See [`CatalogClient::fetch_all`].
    pub async fn fetch_products(&self) -> Result<FetchOutcome, CatalogError> {
        self.fetch_all("products", &[("include", "variants")]).await
    }

    /// Variants (offers) belonging to one product.
    ///
    /// # Errors
    ///
    /// See [`CatalogClient::fetch_all`].
    pub async fn fetch_variants(&self, product_id: &str) -> Result<FetchOutcome, CatalogError> {
        self.fetch_all("offers", &[("filter[product_id]", product_id)])
            .await
    }

    /// Stock levels for all offers.
    ///
    /// # Errors
    ///
    /// See [`CatalogClient::fetch_all`].
    pub async fn fetch_stocks(&self) -> Result<FetchOutcome, CatalogError> {
        self.fetch_all("offers/stocks", &[]).await
    }

    /// The category tree.
    ///
    /// # Errors
    ///
    /// See [`CatalogClient::fetch_all`].
    pub async fn fetch_categories(&self) -> Result<FetchOutcome, CatalogError> {
        self.fetch_all("categories", &[]).await
    }
}
