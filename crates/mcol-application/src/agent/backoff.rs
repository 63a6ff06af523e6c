//! Bounded retry with linear backoff
//!
//! Attempt `i` (1-based) that fails is followed by a pause of `delay * i`
//! before the next attempt. Cancellation is observed before every attempt
//! and during every pause; a cancelled loop is not a failure.

use std::future::Future;
use std::time::Duration;

use mcol_domain::error::Result;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// How many times to try and how long to wait between tries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Maximum number of attempts, at least one is always made
    pub attempts: u32,
    /// Base pause, multiplied by the attempt number
    pub delay: Duration,
}

impl RetryPolicy {
    /// Create a policy
    pub fn new(attempts: u32, delay: Duration) -> Self {
        Self { attempts, delay }
    }

    /// Pause after the given failed attempt
    pub fn delay_after(&self, attempt: u32) -> Duration {
        self.delay.saturating_mul(attempt)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3, Duration::from_secs(10))
    }
}

/// Run `operation` until it succeeds, attempts run out, or `cancel` fires
///
/// Returns `Ok(Some(value))` on success, `Ok(None)` when cancelled, and the
/// last error once every attempt has failed. The closure receives the
/// 1-based attempt number.
pub async fn retry_with_backoff<T, F, Fut>(
    policy: &RetryPolicy,
    cancel: &CancellationToken,
    mut operation: F,
) -> Result<Option<T>>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let attempts = policy.attempts.max(1);
    let mut attempt = 1;

    loop {
        if cancel.is_cancelled() {
            debug!(attempt, "[BACKOFF] Cancelled before attempt");
            return Ok(None);
        }

        match operation(attempt).await {
            Ok(value) => return Ok(Some(value)),
            Err(e) if attempt >= attempts => {
                warn!(attempt, error = %e, "[BACKOFF] Giving up after last attempt");
                return Err(e);
            }
            Err(e) => {
                let pause = policy.delay_after(attempt);
                warn!(attempt, error = %e, pause = ?pause, "[BACKOFF] Attempt failed, retrying");
                tokio::select! {
                    biased;
                    () = cancel.cancelled() => {
                        debug!(attempt, "[BACKOFF] Cancelled while waiting");
                        return Ok(None);
                    }
                    () = tokio::time::sleep(pause) => {}
                }
                attempt += 1;
            }
        }
    }
}
