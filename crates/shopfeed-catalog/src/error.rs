use thiserror::Error;

/// Failure to obtain a product listing from the catalog service.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Transport failure (connect, timeout, body read). Retried.
    #[error("catalog request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The body was not JSON at all. Malformed products inside valid JSON are
    /// skipped instead.
    #[error("catalog body from {context} is not valid JSON: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    /// HTTP 429. Retried.
    #[error("catalog host {domain} is throttling requests (Retry-After: {retry_after_secs}s)")]
    RateLimited {
        domain: String,
        retry_after_secs: u64,
    },

    #[error("catalog listing not found at {url}")]
    NotFound { url: String },

    #[error("catalog returned HTTP {status} for {url}")]
    UnexpectedStatus { status: u16, url: String },

    #[error("invalid catalog URL \"{url}\": {reason}")]
    InvalidUrl { url: String, reason: String },
}
