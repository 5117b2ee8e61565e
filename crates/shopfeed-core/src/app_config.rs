use std::path::PathBuf;

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

#[derive(Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub log_level: String,
    pub store_dir: PathBuf,
    pub catalog_url: Option<String>,
    pub http_timeout_secs: u64,
    pub user_agent: String,
    pub max_retries: u32,
    pub retry_backoff_base_secs: u64,
    pub interest_top_k: usize,
    pub interest_threshold: u64,
    pub ratio_ttl_secs: u64,
    pub ratio_max_entries: usize,
    pub warm_concurrency: usize,
    pub probe_max_bytes: u64,
}

impl AppConfig {
    /// Aspect-ratio TTL in epoch-millisecond units, saturating on overflow.
    #[must_use]
    pub fn ratio_ttl_ms(&self) -> i64 {
        i64::try_from(self.ratio_ttl_secs.saturating_mul(1_000)).unwrap_or(i64::MAX)
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("log_level", &self.log_level)
            .field("store_dir", &self.store_dir)
            // Catalog URLs may embed storefront tokens in the query string.
            .field(
                "catalog_url",
                &self.catalog_url.as_ref().map(|_| "[redacted]"),
            )
            .field("http_timeout_secs", &self.http_timeout_secs)
            .field("user_agent", &self.user_agent)
            .field("max_retries", &self.max_retries)
            .field("retry_backoff_base_secs", &self.retry_backoff_base_secs)
            .field("interest_top_k", &self.interest_top_k)
            .field("interest_threshold", &self.interest_threshold)
            .field("ratio_ttl_secs", &self.ratio_ttl_secs)
            .field("ratio_max_entries", &self.ratio_max_entries)
            .field("warm_concurrency", &self.warm_concurrency)
            .field("probe_max_bytes", &self.probe_max_bytes)
            .finish()
    }
}
