//! Bounded retry with exponential backoff for store calls
//!
//! Store adapters wrap each round-trip in [`RetryPolicy::run`]. Every attempt is
//! bounded by `attempt_timeout`; a timeout counts as a transient failure. Only
//! [`RepositoryError::Unavailable`] is retried, everything else is returned to
//! the caller on the first occurrence.

use std::future::Future;
use std::time::Duration;

use crate::db::RepositoryError;

/// Retry policy configuration for store adapters.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total attempts including the first one (minimum 1)
    pub max_attempts: u32,
    /// Delay before the second attempt
    pub base_delay: Duration,
    /// Upper bound for any single delay
    pub max_delay: Duration,
    /// Upper bound for a single attempt
    pub attempt_timeout: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(50),
            max_delay: Duration::from_secs(1),
            attempt_timeout: Duration::from_secs(5),
        }
    }
}

impl RetryPolicy {
    /// Single attempt, still bounded by the default timeout.
    pub fn no_retry() -> Self {
        Self {
            max_attempts: 1,
            ..Default::default()
        }
    }

    /// Exponential policy with the given bounds.
    pub fn exponential(max_attempts: u32, base_delay: Duration, attempt_timeout: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
            max_delay: Duration::from_secs(1).max(base_delay),
            attempt_timeout,
        }
    }

    /// Delay to wait after the given (1-indexed) failed attempt.
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        if attempt == 0 {
            return Duration::ZERO;
        }
        let factor = 2u32.saturating_pow(attempt - 1);
        self.base_delay.saturating_mul(factor).min(self.max_delay)
    }

    /// Run `op` until it succeeds, fails permanently, or attempts run out.
    pub async fn run<T, F, Fut>(
        &self,
        operation: &'static str,
        mut op: F,
    ) -> Result<T, RepositoryError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, RepositoryError>>,
    {
        let max_attempts = self.max_attempts.max(1);
        let mut attempt = 1;

        loop {
            let outcome = match tokio::time::timeout(self.attempt_timeout, op()).await {
                Ok(result) => result,
                Err(_) => Err(RepositoryError::Unavailable(format!(
                    "{} timed out after {}ms",
                    operation,
                    self.attempt_timeout.as_millis()
                ))),
            };

            match outcome {
                Err(err) if err.is_transient() && attempt < max_attempts => {
                    let delay = self.delay_for_attempt(attempt);
                    tracing::warn!(
                        operation,
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        error = %err,
                        "Transient store failure, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(err) if err.is_transient() => {
                    tracing::error!(
                        operation,
                        attempts = attempt,
                        error = %err,
                        "Store retries exhausted"
                    );
                    return Err(err);
                }
                other => return other,
            }
        }
    }
}
