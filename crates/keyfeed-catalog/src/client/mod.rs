//! HTTP client for the upstream catalog REST API.

mod fetch_all;

use std::time::Duration;

use keyfeed_core::AppConfig;
use reqwest::{Client, StatusCode, Url};
use serde_json::Value;

use crate::error::CatalogError;
use crate::retry::{retry_with_policy, RetryPolicy};
use crate::types::page_records;

/// Hard cap on pages fetched per collection. Guards against cursors that
/// never report the end.
pub const DEFAULT_MAX_PAGES: usize = 200;

pub const DEFAULT_PER_PAGE: u32 = 50;

/// Authenticated client for the catalog API.
///
/// Every request carries the bearer token and `Accept: application/json`.
/// Only HTTP 200 counts as success. Transient failures are retried under
/// the configured [`RetryPolicy`]; 401 is returned immediately, as is 404
/// on single-record lookups.
pub struct CatalogClient {
    client: Client,
    base_url: Url,
    api_key: String,
    pub(super) policy: RetryPolicy,
    pub(super) per_page: u32,
    pub(super) max_pages: usize,
}

impl CatalogClient {
    /// Creates a client for `base_url` (e.g. `https://openapi.keycrm.app/v1`).
    ///
    /// # Errors
    ///
    /// - [`CatalogError::Http`] if the underlying `reqwest::Client` cannot be
    ///   constructed.
    /// - [`CatalogError::InvalidBaseUrl`] if `base_url` does not parse.
    pub fn new(
        base_url: &str,
        api_key: &str,
        timeout_secs: u64,
        user_agent: &str,
        policy: RetryPolicy,
    ) -> Result<Self, CatalogError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;

        // Exactly one trailing slash, so `Url::join` appends resource paths
        // instead of replacing the last segment (`/v1`).
        let normalised = format!("{}/", base_url.trim().trim_end_matches('/'));
        let parsed = Url::parse(&normalised).map_err(|e| CatalogError::InvalidBaseUrl {
            base_url: base_url.to_owned(),
            reason: e.to_string(),
        })?;
        if parsed.cannot_be_a_base() {
            return Err(CatalogError::InvalidBaseUrl {
                base_url: base_url.to_owned(),
                reason: "URL cannot be used as a base".to_owned(),
            });
        }

        Ok(Self {
            client,
            base_url: parsed,
            api_key: api_key.to_owned(),
            policy,
            per_page: DEFAULT_PER_PAGE,
            max_pages: DEFAULT_MAX_PAGES,
        })
    }

    /// Builds a client from application configuration.
    ///
    /// # Errors
    ///
    /// See [`CatalogClient::new`].
    pub fn from_config(config: &AppConfig) -> Result<Self, CatalogError> {
        let policy = RetryPolicy::new(
            config.max_attempts,
            Duration::from_millis(config.backoff_base_ms),
        );
        Ok(Self::new(
            &config.api_url,
            &config.api_key,
            config.request_timeout_secs,
            &config.user_agent,
            policy,
        )?
        .with_paging(config.page_size, config.max_pages))
    }

    /// Overrides the page size and the per-collection page cap.
    #[must_use]
    pub fn with_paging(mut self, per_page: u32, max_pages: usize) -> Self {
        self.per_page = per_page.max(1);
        self.max_pages = max_pages.max(1);
        self
    }

    /// Fetches one page of `resource`, retrying transient failures.
    ///
    /// A body without a record list counts as a malformed page and is
    /// retried like any other transient failure. So is a 404: a listing
    /// endpoint always exists, and a missing page is a transient upstream
    /// fault rather than an absent record.
    ///
    /// # Errors
    ///
    /// - [`CatalogError::Unauthorized`] on HTTP 401 (not retried).
    /// - [`CatalogError::RateLimited`] when 429 persists past the budget.
    /// - [`CatalogError::UnexpectedStatus`], [`CatalogError::Http`],
    ///   [`CatalogError::Deserialize`] or [`CatalogError::MalformedPage`]
    ///   when the last attempt failed.
    pub async fn fetch_page(
        &self,
        resource: &str,
        page: u32,
        params: &[(&str, &str)],
    ) -> Result<Value, CatalogError> {
        let url = self.page_url(resource, page, params)?;
        let url = &url;
        retry_with_policy(&self.policy, || async move {
            let body = self.request_json(url).await.map_err(|err| match err {
                CatalogError::NotFound { url } => CatalogError::UnexpectedStatus { status: 404, url },
                other => other,
            })?;
            if page_records(&body).is_none() {
                return Err(CatalogError::MalformedPage {
                    url: url.to_string(),
                    reason: "response has no `data` array".to_owned(),
                });
            }
            Ok(body)
        })
        .await
    }

    /// URL of one page: `{base}/{resource}?page=N&per_page=M&{params}`.
    pub(super) fn page_url(
        &self,
        resource: &str,
        page: u32,
        params: &[(&str, &str)],
    ) -> Result<Url, CatalogError> {
        let mut url = self.resource_url(resource)?;
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("page", &page.to_string());
            query.append_pair("per_page", &self.per_page.to_string());
            for (key, value) in params {
                query.append_pair(key, value);
            }
        }
        Ok(url)
    }

    pub(super) fn resource_url(&self, resource: &str) -> Result<Url, CatalogError> {
        self.base_url
            .join(resource.trim_start_matches('/'))
            .map_err(|e| CatalogError::InvalidBaseUrl {
                base_url: self.base_url.to_string(),
                reason: format!("cannot append \"{resource}\": {e}"),
            })
    }

    /// One GET request, mapping the response status onto [`CatalogError`].
    pub(super) async fn request_json(&self, url: &Url) -> Result<Value, CatalogError> {
        let response = self
            .client
            .get(url.clone())
            .bearer_auth(&self.api_key)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await?;
        let status = response.status();

        if status == StatusCode::UNAUTHORIZED {
            return Err(CatalogError::Unauthorized {
                url: url.to_string(),
            });
        }

        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after_secs = response
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.trim().parse::<u64>().ok());
            return Err(CatalogError::RateLimited {
                url: url.to_string(),
                retry_after_secs,
            });
        }

        if status == StatusCode::NOT_FOUND {
            return Err(CatalogError::NotFound {
                url: url.to_string(),
            });
        }

        if status != StatusCode::OK {
            return Err(CatalogError::UnexpectedStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let body = response.text().await?;
        serde_json::from_str::<Value>(&body).map_err(|e| CatalogError::Deserialize {
            context: format!("response from {url}"),
            source: e,
        })
    }
}

#[cfg(test)]
#[path = "../client_test.rs"]
mod tests;
