//! Shared configuration and feed domain types for the keyfeed workspace.

pub mod app_config;
pub mod config;
pub mod offers;

pub use app_config::{AppConfig, Environment, ImageMode};
pub use config::{load_app_config, load_app_config_from_env};
pub use offers::{
    round_money, Category, Currency, FeedDocument, Offer, OfferParam, ShopMeta,
};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
