use keyfeed_catalog::CatalogError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FeedError {
    #[error("catalog error: {0}")]
    Catalog(#[from] CatalogError),

    #[error("upstream catalog returned no products")]
    EmptyCatalog,

    #[error("XML write error: {0}")]
    Io(#[from] std::io::Error),

    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("feed generation timed out after {secs}s")]
    Timeout { secs: u64 },
}

impl FeedError {
    /// `true` when the upstream API rejected our credentials.
    #[must_use]
    pub fn is_upstream_auth(&self) -> bool {
        matches!(self, FeedError::Catalog(CatalogError::Unauthorized { .. }))
    }
}
