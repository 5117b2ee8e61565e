//! Backoff for catalog fetches.
//!
//! Only throttling (429) and transport failures are retried. A 404, another
//! status, or a body that is not JSON comes back on the first attempt.

use std::future::Future;
use std::time::Duration;

use crate::error::CatalogError;

fn is_transient(err: &CatalogError) -> bool {
    matches!(
        err,
        CatalogError::RateLimited { .. } | CatalogError::Http(_)
    )
}

/// Delay before retry number `attempt + 1`: `base_secs * 2^attempt`.
fn backoff_delay(base_secs: u64, attempt: u32) -> Duration {
    Duration::from_secs(base_secs.saturating_mul(1u64 << attempt.min(62)))
}

/// Runs `operation` up to `max_retries + 1` times, sleeping with exponential
/// backoff between transient failures.
///
/// The error from the final attempt is returned unchanged, so a throttled
/// listing still reports the host's last `Retry-After` value.
pub(crate) async fn retry_with_backoff<T, F, Fut>(
    max_retries: u32,
    backoff_base_secs: u64,
    mut operation: F,
) -> Result<T, CatalogError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, CatalogError>>,
{
    let mut attempt = 0u32;
    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) if attempt < max_retries && is_transient(&err) => {
                let delay = backoff_delay(backoff_base_secs, attempt);
                attempt += 1;
                tracing::warn!(
                    attempt,
                    max_retries,
                    delay_secs = delay.as_secs(),
                    error = %err,
                    "catalog fetch failed transiently; backing off"
                );
                tokio::time::sleep(delay).await;
            }
            Err(err) => return Err(err),
        }
    }
}
