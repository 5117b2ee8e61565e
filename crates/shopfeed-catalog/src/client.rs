use std::time::Duration;

use reqwest::Client;
use shopfeed_core::{AppConfig, Product};

use crate::error::CatalogError;
use crate::normalize::parse_catalog;
use crate::rate_limit::retry_with_backoff;

/// HTTP client for the catalog listing endpoint.
///
/// Maps 429, 404, and other non-2xx responses to typed errors. Transient
/// errors (429, network failures) are retried with exponential backoff up to
/// `max_retries` additional attempts.
pub struct CatalogClient {
    client: Client,
    /// Maximum number of retry attempts after the first failure.
    max_retries: u32,
    /// Base delay in seconds for exponential backoff: `backoff_base_secs * 2^attempt`.
    backoff_base_secs: u64,
}

impl CatalogClient {
    /// Creates a `CatalogClient` with the given timeout, `User-Agent`, and retry policy.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(
        timeout_secs: u64,
        user_agent: &str,
        max_retries: u32,
        backoff_base_secs: u64,
    ) -> Result<Self, CatalogError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;
        Ok(Self {
            client,
            max_retries,
            backoff_base_secs,
        })
    }

    /// Builds a client from the HTTP and retry settings in [`AppConfig`].
    ///
    /// # Errors
    ///
    /// Same as [`CatalogClient::new`].
    pub fn from_config(config: &AppConfig) -> Result<Self, CatalogError> {
        Self::new(
            config.http_timeout_secs,
            &config.user_agent,
            config.max_retries,
            config.retry_backoff_base_secs,
        )
    }

    /// Fetches and normalizes the product listing at `url`.
    ///
    /// # Errors
    ///
    /// - [`CatalogError::InvalidUrl`]: `url` is not an absolute http(s) URL.
    /// - [`CatalogError::RateLimited`]: HTTP 429 after all retries.
    /// - [`CatalogError::NotFound`]: HTTP 404 (not retried).
    /// - [`CatalogError::UnexpectedStatus`]: any other non-2xx status (not retried).
    /// - [`CatalogError::Http`]: transport failure after all retries.
    /// - [`CatalogError::Deserialize`]: body is not JSON (not retried).
    pub async fn fetch_products(&self, url: &str) -> Result<Vec<Product>, CatalogError> {
        let parsed = validate_url(url)?;
        let domain = parsed.host_str().unwrap_or(url).to_owned();

        let body = retry_with_backoff(self.max_retries, self.backoff_base_secs, || {
            let url = url.to_owned();
            let domain = domain.clone();
            async move {
                let response = self.client.get(&url).send().await?;
                let status = response.status();

                if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                    let retry_after_secs = response
                        .headers()
                        .get(reqwest::header::RETRY_AFTER)
                        .and_then(|v| v.to_str().ok())
                        .and_then(|s| s.parse::<u64>().ok())
                        .unwrap_or(60);
                    return Err(CatalogError::RateLimited {
                        domain,
                        retry_after_secs,
                    });
                }

                if status == reqwest::StatusCode::NOT_FOUND {
                    return Err(CatalogError::NotFound { url });
                }

                if !status.is_success() {
                    return Err(CatalogError::UnexpectedStatus {
                        status: status.as_u16(),
                        url,
                    });
                }

                Ok(response.text().await?)
            }
        })
        .await?;

        let products = parse_catalog(&body)?;
        tracing::info!(url, count = products.len(), "fetched catalog products");
        Ok(products)
    }
}

/// Checks that `url` is an absolute http(s) URL.
///
/// # Errors
///
/// Returns [`CatalogError::InvalidUrl`] otherwise.
pub(crate) fn validate_url(url: &str) -> Result<reqwest::Url, CatalogError> {
    let parsed = reqwest::Url::parse(url).map_err(|e| CatalogError::InvalidUrl {
        url: url.to_owned(),
        reason: e.to_string(),
    })?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(CatalogError::InvalidUrl {
            url: url.to_owned(),
            reason: format!("unsupported scheme \"{}\"", parsed.scheme()),
        });
    }
    Ok(parsed)
}
