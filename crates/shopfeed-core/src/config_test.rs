use std::collections::HashMap;
use std::env::VarError;

use super::*;

fn lookup_from_map<'a>(
    map: &'a HashMap<&'a str, &'a str>,
) -> impl Fn(&str) -> Result<String, VarError> + 'a {
    move |key| {
        map.get(key)
            .map(|v| (*v).to_string())
            .ok_or(VarError::NotPresent)
    }
}

#[test]
fn parse_environment_known_values() {
    assert_eq!(
        parse_environment("development").unwrap(),
        Environment::Development
    );
    assert_eq!(parse_environment("test").unwrap(), Environment::Test);
    assert_eq!(
        parse_environment("production").unwrap(),
        Environment::Production
    );
}

#[test]
fn parse_environment_rejects_unknown() {
    let err = parse_environment("staging").unwrap_err();
    assert!(matches!(err, ConfigError::InvalidEnvVar { ref var, .. } if var == "SHOPFEED_ENV"));
}

#[test]
fn build_app_config_defaults_with_empty_env() {
    let map: HashMap<&str, &str> = HashMap::new();
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.env, Environment::Development);
    assert_eq!(cfg.log_level, "info");
    assert_eq!(cfg.store_dir, std::path::PathBuf::from("./.shopfeed"));
    assert!(cfg.catalog_url.is_none());
    assert_eq!(cfg.http_timeout_secs, 30);
    assert_eq!(cfg.max_retries, 3);
    assert_eq!(cfg.retry_backoff_base_secs, 1);
    assert_eq!(cfg.interest_top_k, 2);
    assert_eq!(cfg.interest_threshold, 2);
    assert_eq!(cfg.ratio_ttl_secs, 7 * 24 * 60 * 60);
    assert_eq!(cfg.ratio_max_entries, 2000);
    assert_eq!(cfg.warm_concurrency, 6);
    assert_eq!(cfg.probe_max_bytes, 65_536);
}

#[test]
fn ratio_ttl_ms_is_seven_days_by_default() {
    let map: HashMap<&str, &str> = HashMap::new();
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.ratio_ttl_ms(), 604_800_000);
}

#[test]
fn build_app_config_overrides() {
    let mut map = HashMap::new();
    map.insert("SHOPFEED_ENV", "production");
    map.insert("SHOPFEED_CATALOG_URL", "https://shop.example.com/api/products");
    map.insert("SHOPFEED_INTEREST_TOP_K", "3");
    map.insert("SHOPFEED_RATIO_MAX_ENTRIES", "50");
    map.insert("SHOPFEED_WARM_CONCURRENCY", "2");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.env, Environment::Production);
    assert_eq!(
        cfg.catalog_url.as_deref(),
        Some("https://shop.example.com/api/products")
    );
    assert_eq!(cfg.interest_top_k, 3);
    assert_eq!(cfg.ratio_max_entries, 50);
    assert_eq!(cfg.warm_concurrency, 2);
}

#[test]
fn blank_catalog_url_is_none() {
    let mut map = HashMap::new();
    map.insert("SHOPFEED_CATALOG_URL", "   ");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert!(cfg.catalog_url.is_none());
}

#[test]
fn invalid_timeout_is_rejected() {
    let mut map = HashMap::new();
    map.insert("SHOPFEED_HTTP_TIMEOUT_SECS", "soon");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "SHOPFEED_HTTP_TIMEOUT_SECS"),
        "expected InvalidEnvVar(SHOPFEED_HTTP_TIMEOUT_SECS), got: {result:?}"
    );
}

#[test]
fn zero_warm_concurrency_is_rejected() {
    let mut map = HashMap::new();
    map.insert("SHOPFEED_WARM_CONCURRENCY", "0");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "SHOPFEED_WARM_CONCURRENCY"),
        "expected InvalidEnvVar(SHOPFEED_WARM_CONCURRENCY), got: {result:?}"
    );
}

#[test]
fn invalid_threshold_is_rejected() {
    let mut map = HashMap::new();
    map.insert("SHOPFEED_INTEREST_THRESHOLD", "-1");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "SHOPFEED_INTEREST_THRESHOLD"),
        "expected InvalidEnvVar(SHOPFEED_INTEREST_THRESHOLD), got: {result:?}"
    );
}

#[test]
fn debug_redacts_catalog_url() {
    let mut map = HashMap::new();
    map.insert("SHOPFEED_CATALOG_URL", "https://shop.example.com/api?token=secret");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    let rendered = format!("{cfg:?}");
    assert!(!rendered.contains("secret"));
    assert!(rendered.contains("[redacted]"));
}
