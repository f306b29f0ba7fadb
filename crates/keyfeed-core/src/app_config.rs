use std::net::SocketAddr;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

/// How variant and product image lists are combined for one offer.
///
/// Upstream deployments differ in where pictures are attached, so both
/// behaviours are kept and selected through `KEYFEED_IMAGE_MODE`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ImageMode {
    /// Variant images when the variant has any, product images otherwise.
    #[default]
    Fallback,
    /// Variant images followed by product images, deduplicated.
    Union,
}

impl std::fmt::Display for ImageMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ImageMode::Fallback => write!(f, "fallback"),
            ImageMode::Union => write!(f, "union"),
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    pub api_url: String,
    pub api_key: String,
    pub shop_name: String,
    pub company_name: String,
    pub shop_url: String,
    pub currency_id: String,
    pub currency_rate: String,
    pub page_size: u32,
    pub max_pages: usize,
    pub max_attempts: u32,
    pub backoff_base_ms: u64,
    pub request_timeout_secs: u64,
    pub user_agent: String,
    pub image_mode: ImageMode,
    pub include_categories: bool,
    pub use_stock_endpoint: bool,
    pub run_timeout_secs: u64,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("bind_addr", &self.bind_addr)
            .field("log_level", &self.log_level)
            .field("api_url", &self.api_url)
            .field("api_key", &"[redacted]")
            .field("shop_name", &self.shop_name)
            .field("company_name", &self.company_name)
            .field("shop_url", &self.shop_url)
            .field("currency_id", &self.currency_id)
            .field("currency_rate", &self.currency_rate)
            .field("page_size", &self.page_size)
            .field("max_pages", &self.max_pages)
            .field("max_attempts", &self.max_attempts)
            .field("backoff_base_ms", &self.backoff_base_ms)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("user_agent", &self.user_agent)
            .field("image_mode", &self.image_mode)
            .field("include_categories", &self.include_categories)
            .field("use_stock_endpoint", &self.use_stock_endpoint)
            .field("run_timeout_secs", &self.run_timeout_secs)
            .finish()
    }
}
