use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if any value is present but invalid.
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
/// Returns `ConfigError` if any value is present but invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Every variable is optional; the lookup is injected so tests can use a plain
/// `HashMap` instead of mutating the process environment.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::path::PathBuf;

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

    let parse_positive_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        let value = or_default(var, default)
            .parse::<usize>()
            .map_err(|e| invalid(var, e.to_string()))?;
        if value == 0 {
            return Err(invalid(var, "must be greater than zero".to_string()));
        }
        Ok(value)
    };

    let env = parse_environment(&or_default("SHOPFEED_ENV", "development"))?;
    let log_level = or_default("SHOPFEED_LOG_LEVEL", "info");
    let store_dir = PathBuf::from(or_default("SHOPFEED_STORE_DIR", "./.shopfeed"));
    let catalog_url = lookup("SHOPFEED_CATALOG_URL")
        .ok()
        .filter(|s| !s.trim().is_empty());

    let http_timeout_secs = parse_u64("SHOPFEED_HTTP_TIMEOUT_SECS", "30")?;
    let user_agent = or_default("SHOPFEED_USER_AGENT", "shopfeed/0.1 (feed-pipeline)");
    let max_retries = parse_u32("SHOPFEED_MAX_RETRIES", "3")?;
    let retry_backoff_base_secs = parse_u64("SHOPFEED_RETRY_BACKOFF_BASE_SECS", "1")?;

    let interest_top_k = parse_positive_usize("SHOPFEED_INTEREST_TOP_K", "2")?;
    let interest_threshold = parse_u64("SHOPFEED_INTEREST_THRESHOLD", "2")?;

    let ratio_ttl_secs = parse_u64("SHOPFEED_RATIO_TTL_SECS", "604800")?;
    let ratio_max_entries = parse_positive_usize("SHOPFEED_RATIO_MAX_ENTRIES", "2000")?;
    let warm_concurrency = parse_positive_usize("SHOPFEED_WARM_CONCURRENCY", "6")?;
    let probe_max_bytes = parse_u64("SHOPFEED_PROBE_MAX_BYTES", "65536")?;

    Ok(AppConfig {
        env,
        log_level,
        store_dir,
        catalog_url,
        http_timeout_secs,
        user_agent,
        max_retries,
        retry_backoff_base_secs,
        interest_top_k,
        interest_threshold,
        ratio_ttl_secs,
        ratio_max_entries,
        warm_concurrency,
        probe_max_bytes,
    })
}

/// Parse a string into an `Environment` variant.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidEnvVar`] for anything other than
/// `development`, `test`, or `production`.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "SHOPFEED_ENV".to_string(),
            reason: format!("unknown environment \"{other}\""),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
