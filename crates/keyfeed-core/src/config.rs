use crate::app_config::{AppConfig, Environment, ImageMode};
use crate::ConfigError;

const DEFAULT_API_URL: &str = "https://openapi.keycrm.app/v1";

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the process environment so tests can feed a plain `HashMap`.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;

    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingEnvVar(var.to_string()))
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        or_default(var, default)
            .parse::<u32>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        or_default(var, default)
            .parse::<u64>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        or_default(var, default)
            .parse::<usize>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_flag = |var: &str, default: bool| -> Result<bool, ConfigError> {
        match lookup(var) {
            Err(_) => Ok(default),
            Ok(raw) => parse_bool(&raw).ok_or_else(|| {
                invalid(var, format!("expected true/false, got \"{raw}\""))
            }),
        }
    };

    let api_key = require("KEYCRM_API_KEY")?;
    let api_url = or_default("KEYCRM_API_URL", DEFAULT_API_URL);

    let env = parse_environment(&or_default("KEYFEED_ENV", "development"));
    let log_level = or_default("KEYFEED_LOG_LEVEL", "info");

    let mut bind_addr = or_default("KEYFEED_BIND_ADDR", "0.0.0.0:8080")
        .parse::<SocketAddr>()
        .map_err(|e| invalid("KEYFEED_BIND_ADDR", e.to_string()))?;
    // Hosting platforms hand out the listening port through `PORT`.
    if let Ok(port) = lookup("PORT") {
        let port = port
            .parse::<u16>()
            .map_err(|e| invalid("PORT", e.to_string()))?;
        bind_addr.set_port(port);
    }

    let shop_name = or_default("SHOP_NAME", "My Shop");
    let company_name = or_default("COMPANY_NAME", "My Shop LLC");
    let shop_url = or_default("SHOP_URL", "https://example.com");

    let currency_id = or_default("KEYFEED_CURRENCY", "UAH");
    let currency_rate = or_default("KEYFEED_CURRENCY_RATE", "1");

    let page_size = parse_u32("KEYFEED_PAGE_SIZE", "50")?;
    if page_size == 0 {
        return Err(invalid("KEYFEED_PAGE_SIZE", "must be at least 1".into()));
    }
    let max_pages = parse_usize("KEYFEED_MAX_PAGES", "200")?;
    let max_attempts = parse_u32("KEYFEED_MAX_ATTEMPTS", "3")?;
    if max_attempts == 0 {
        return Err(invalid("KEYFEED_MAX_ATTEMPTS", "must be at least 1".into()));
    }
    let backoff_base_ms = parse_u64("KEYFEED_BACKOFF_BASE_MS", "1000")?;
    let request_timeout_secs = parse_u64("KEYFEED_REQUEST_TIMEOUT_SECS", "30")?;
    let user_agent = or_default("KEYFEED_USER_AGENT", "keyfeed/0.1 (catalog-feed)");

    let image_mode = parse_image_mode(&or_default("KEYFEED_IMAGE_MODE", "fallback"))
        .ok_or_else(|| invalid("KEYFEED_IMAGE_MODE", "expected fallback or union".into()))?;
    let include_categories = parse_flag("KEYFEED_INCLUDE_CATEGORIES", true)?;
    let use_stock_endpoint = parse_flag("KEYFEED_USE_STOCK_ENDPOINT", false)?;
    let run_timeout_secs = parse_u64("KEYFEED_RUN_TIMEOUT_SECS", "300")?;

    Ok(AppConfig {
        env,
        bind_addr,
        log_level,
        api_url,
        api_key,
        shop_name,
        company_name,
        shop_url,
        currency_id,
        currency_rate,
        page_size,
        max_pages,
        max_attempts,
        backoff_base_ms,
        request_timeout_secs,
        user_agent,
        image_mode,
        include_categories,
        use_stock_endpoint,
        run_timeout_secs,
    })
}

/// Parse a string into an `Environment` variant.
///
/// Unrecognized values default to `Environment::Development`.
fn parse_environment(s: &str) -> Environment {
    match s {
        "production" => Environment::Production,
        "test" => Environment::Test,
        _ => Environment::Development,
    }
}

fn parse_image_mode(s: &str) -> Option<ImageMode> {
    match s.trim().to_ascii_lowercase().as_str() {
        "fallback" => Some(ImageMode::Fallback),
        "union" => Some(ImageMode::Union),
        _ => None,
    }
}

fn parse_bool(s: &str) -> Option<bool> {
    match s.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
