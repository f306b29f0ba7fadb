pub mod assemble;
pub mod cache;
pub mod client;
pub mod error;
pub mod lookups;
pub mod pagination;
pub mod resolve;
pub mod retry;
pub mod source;
pub mod types;

pub use assemble::{AssembleOptions, AssembledOffers, OfferAssembler};
pub use cache::ProductCache;
pub use client::CatalogClient;
pub use error::CatalogError;
pub use lookups::StockLevels;
pub use resolve::{FieldKind, ResolvedFields};
pub use retry::{Backoff, RetryPolicy};
pub use source::CatalogSource;
pub use types::{FetchOutcome, RawRecord};
