use thiserror::Error;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("upstream rejected credentials (401) for {url}")]
    Unauthorized { url: String },

    #[error("rate limited by upstream for {url}")]
    RateLimited {
        url: String,
        retry_after_secs: Option<u64>,
    },

    #[error("resource not found: {url}")]
    NotFound { url: String },

    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("malformed page from {url}: {reason}")]
    MalformedPage { url: String, reason: String },

    #[error("invalid API base URL \"{base_url}\": {reason}")]
    InvalidBaseUrl { base_url: String, reason: String },
}

impl CatalogError {
    /// Fatal errors abort the whole generation run; everything else is
    /// recovered locally as a partial result.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            CatalogError::Unauthorized { .. } | CatalogError::InvalidBaseUrl { .. }
        )
    }
}
