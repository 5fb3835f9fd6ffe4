//! Bounded exponential-backoff retry for Maps API calls

use std::future::Future;
use std::time::Duration;

use super::CancellationToken;
use crate::maps::MapsError;

/// How a failing call is retried.
///
/// The wait after failed attempt `k` (1-indexed) is
/// `min(max_wait, base_wait * 2^(k-1))`.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total attempts including the first one
    pub max_attempts: u32,
    pub base_wait: Duration,
    pub max_wait: Duration,
    /// Which errors are worth another attempt
    pub retryable: fn(&MapsError) -> bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_wait: Duration::from_secs(1),
            max_wait: Duration::from_secs(10),
            retryable: MapsError::is_retryable,
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base_wait: Duration, max_wait: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_wait,
            max_wait,
            ..Default::default()
        }
    }

    /// Wait applied after the given failed attempt (1-indexed)
    pub fn wait_after(&self, attempt: u32) -> Duration {
        let exp = 2u32.saturating_pow(attempt.saturating_sub(1));
        self.base_wait.saturating_mul(exp).min(self.max_wait)
    }

    pub fn should_retry(&self, error: &MapsError) -> bool {
        (self.retryable)(error)
    }
}

/// Run `op` under `policy`.
///
/// `op` receives the 1-indexed attempt number. Non-retryable errors return
/// immediately; retryable ones are retried until attempts run out, at which
/// point the last error is returned. Cancellation is checked before every
/// backoff sleep and aborts the sleep with `MapsError::Cancelled`.
pub async fn retry<T, F, Fut>(
    policy: &RetryPolicy,
    cancel: &CancellationToken,
    label: &str,
    mut op: F,
) -> Result<T, MapsError>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, MapsError>>,
{
    let mut attempt = 1;
    loop {
        let err = match op(attempt).await {
            Ok(value) => return Ok(value),
            Err(err) => err,
        };

        if !policy.should_retry(&err) {
            log::debug!("{}: attempt {} failed permanently: {}", label, attempt, err);
            return Err(err);
        }
        if attempt >= policy.max_attempts {
            log::warn!("{}: giving up after {} attempts: {}", label, attempt, err);
            return Err(err);
        }
        if cancel.is_cancelled() {
            log::info!("{}: cancelled before retry", label);
            return Err(MapsError::Cancelled);
        }

        let wait = policy.wait_after(attempt);
        log::warn!(
            "{}: attempt {}/{} failed ({}), retrying in {:?}",
            label,
            attempt,
            policy.max_attempts,
            err,
            wait
        );

        tokio::select! {
            _ = tokio::time::sleep(wait) => {}
            _ = cancel.cancelled() => {
                log::info!("{}: cancelled during backoff", label);
                return Err(MapsError::Cancelled);
            }
        }
        attempt += 1;
    }
}
