//! Exponential backoff for transient fetch failures.
//!
//! Rate limiting (HTTP 429) and network-level failures are retried; every
//! other error is returned on the first attempt.

use std::future::Future;
use std::time::Duration;

use crate::error::SourceError;

/// Returns `true` if `err` is transient and worth another attempt.
///
/// - [`SourceError::RateLimited`]: the server asked us to back off.
/// - [`SourceError::Http`]: connection reset, timeout, DNS failure.
///
/// Non-2xx statuses other than 429 and parse failures return the same
/// result on a retry and are propagated immediately.
fn is_retriable(err: &SourceError) -> bool {
    matches!(err, SourceError::RateLimited { .. } | SourceError::Http(_))
}

/// Runs `operation`, retrying transient errors up to `max_retries` extra times.
///
/// The wait before retry `n` (1-based) is `backoff_base_secs * 2^(n-1)`
/// seconds, or the server's `Retry-After` hint when that is longer. With
/// `max_retries = 1` the operation runs at most twice.
pub(crate) async fn retry_with_backoff<T, F, Fut>(
    max_retries: u32,
    backoff_base_secs: u64,
    mut operation: F,
) -> Result<T, SourceError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, SourceError>>,
{
    let mut attempt = 0u32;

    loop {
        let err = match operation().await {
            Ok(value) => return Ok(value),
            Err(err) if !is_retriable(&err) || attempt >= max_retries => return Err(err),
            Err(err) => err,
        };

        let backoff_secs = backoff_base_secs.saturating_mul(1u64 << attempt.min(62));
        let delay_secs = match &err {
            SourceError::RateLimited {
                retry_after_secs, ..
            } => backoff_secs.max(*retry_after_secs),
            _ => backoff_secs,
        };
        tracing::warn!(
            attempt,
            max_retries,
            delay_secs,
            error = %err,
            "transient fetch error, retrying after backoff"
        );
        tokio::time::sleep(Duration::from_secs(delay_secs)).await;
        attempt += 1;
    }
}
