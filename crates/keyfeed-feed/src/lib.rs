//! YML catalog feed generation.
//!
//! Drives one generation run end to end: fetches the product catalog,
//! assembles per-SKU offers and renders them as a UTF-8 YML document for
//! marketplace aggregators.

pub mod error;
pub mod pipeline;
pub mod xml;

pub use error::FeedError;
pub use pipeline::{generate_feed, generate_feed_with, FeedOutput, FeedSettings};
pub use xml::serialize;
