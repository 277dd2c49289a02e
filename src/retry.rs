//! Bounded retry with exponential backoff and jitter for upstream fetches.
//!
//! A transient network error or 5xx on one poll would otherwise blank a
//! whole window of the board; a couple of quick retries absorbs almost all
//! of those. Retries stay inside the per-window timeout the aggregator
//! imposes, so the policy defaults are deliberately tight.

use std::time::Duration;

use rand::Rng;
use tracing::{debug, warn};

use crate::error::FetchError;

/// Retry policy configuration.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Maximum number of attempts (including the initial try)
    pub max_attempts: u32,
    /// Base delay in milliseconds for exponential backoff
    pub base_delay_ms: u64,
    /// Cap for a single backoff delay in milliseconds
    pub max_delay_ms: u64,
    /// Maximum total elapsed time across all attempts in milliseconds
    pub max_elapsed_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_ms: 100,
            max_delay_ms: 1000,
            max_elapsed_ms: 3000,
        }
    }
}

impl RetryPolicy {
    /// Load retry policy from environment variables with safe defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            max_attempts: std::env::var("MATCHBOARD_RETRY_MAX_ATTEMPTS")
                .ok()
                .and_then(|s| s.parse().ok())
                .filter(|&n| n > 0 && n <= 10)
                .unwrap_or(defaults.max_attempts),
            base_delay_ms: std::env::var("MATCHBOARD_RETRY_BASE_DELAY_MS")
                .ok()
                .and_then(|s| s.parse().ok())
                .filter(|&n| n > 0)
                .unwrap_or(defaults.base_delay_ms),
            max_delay_ms: std::env::var("MATCHBOARD_RETRY_MAX_DELAY_MS")
                .ok()
                .and_then(|s| s.parse().ok())
                .filter(|&n| n > 0)
                .unwrap_or(defaults.max_delay_ms),
            max_elapsed_ms: std::env::var("MATCHBOARD_RETRY_MAX_ELAPSED_MS")
                .ok()
                .and_then(|s| s.parse().ok())
                .filter(|&n| n > 0)
                .unwrap_or(defaults.max_elapsed_ms),
        }
    }

    /// Backoff delay for a given attempt with full jitter:
    /// random value in [0, min(max_delay, base * 2^(attempt-1))).
    pub fn backoff_ms(&self, attempt: u32) -> u64 {
        let capped = self.capped_backoff_ms(attempt);
        if capped == 0 {
            0
        } else {
            rand::thread_rng().gen_range(0..capped)
        }
    }

    fn capped_backoff_ms(&self, attempt: u32) -> u64 {
        let exponent = attempt.saturating_sub(1);
        let multiplier = if exponent >= 32 {
            u64::MAX
        } else {
            1u64 << exponent
        };
        self.base_delay_ms
            .saturating_mul(multiplier)
            .min(self.max_delay_ms)
    }
}

/// Whether a fetch failure is worth retrying.
///
/// Retryable: transport/timeout errors, HTTP 408, 425, 429 and 5xx.
/// Not retryable: other 4xx and malformed response bodies.
pub fn is_retryable(err: &FetchError) -> bool {
    match err {
        FetchError::Status { status } => matches!(*status, 408 | 425 | 429 | 500..=599),
        FetchError::Transport(e) => match e.status() {
            Some(status) => matches!(status.as_u16(), 408 | 425 | 429 | 500..=599),
            None => true,
        },
        FetchError::Timeout { .. } => true,
        FetchError::Decode(_) => false,
    }
}

/// Run an async fetch operation under the retry policy.
pub async fn retry_fetch<T, Fut, F>(
    policy: &RetryPolicy,
    op_name: &str,
    mut operation: F,
) -> Result<T, FetchError>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Result<T, FetchError>>,
{
    let start = std::time::Instant::now();
    let mut attempt = 1;

    loop {
        match operation().await {
            Ok(value) => {
                if attempt > 1 {
                    debug!(
                        op = op_name,
                        attempts = attempt,
                        elapsed_ms = start.elapsed().as_millis() as u64,
                        "Fetch succeeded after retry"
                    );
                }
                return Ok(value);
            }
            Err(err) => {
                if !is_retryable(&err) {
                    debug!(op = op_name, error = %err, "Non-retryable fetch error");
                    return Err(err);
                }

                let elapsed_ms = start.elapsed().as_millis() as u64;
                if attempt >= policy.max_attempts || elapsed_ms >= policy.max_elapsed_ms {
                    warn!(
                        op = op_name,
                        attempts = attempt,
                        elapsed_ms,
                        error = %err,
                        "Fetch failed, retries exhausted"
                    );
                    return Err(err);
                }

                let remaining_ms = policy.max_elapsed_ms.saturating_sub(elapsed_ms);
                let backoff_ms = policy.backoff_ms(attempt).min(remaining_ms);
                debug!(
                    op = op_name,
                    attempt,
                    backoff_ms,
                    error = %err,
                    "Retrying fetch"
                );
                if backoff_ms > 0 {
                    tokio::time::sleep(Duration::from_millis(backoff_ms)).await;
                }
                attempt += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_policy_defaults() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_attempts, 3);
        assert_eq!(policy.base_delay_ms, 100);
        assert_eq!(policy.max_delay_ms, 1000);
        assert_eq!(policy.max_elapsed_ms, 3000);
    }

    #[test]
    fn test_backoff_schedule_caps() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.capped_backoff_ms(1), 100);
        assert_eq!(policy.capped_backoff_ms(2), 200);
        assert_eq!(policy.capped_backoff_ms(3), 400);
        assert_eq!(policy.capped_backoff_ms(4), 800);
        // Capped at max_delay_ms from here on
        assert_eq!(policy.capped_backoff_ms(5), 1000);
        assert_eq!(policy.capped_backoff_ms(40), 1000);
    }

    #[test]
    fn test_jitter_stays_below_cap() {
        let policy = RetryPolicy::default();
        for _ in 0..100 {
            assert!(policy.backoff_ms(3) < 400);
        }
    }

    #[test]
    fn test_retryable_classification() {
        assert!(is_retryable(&FetchError::Status { status: 500 }));
        assert!(is_retryable(&FetchError::Status { status: 503 }));
        assert!(is_retryable(&FetchError::Status { status: 429 }));
        assert!(is_retryable(&FetchError::Timeout { elapsed_ms: 1000 }));
        assert!(!is_retryable(&FetchError::Status { status: 400 }));
        assert!(!is_retryable(&FetchError::Status { status: 404 }));

        let decode_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        assert!(!is_retryable(&FetchError::Decode(decode_err)));
    }

    #[tokio::test]
    async fn test_retry_succeeds_on_second_attempt() {
        let policy = RetryPolicy {
            max_attempts: 3,
            base_delay_ms: 1,
            max_delay_ms: 5,
            max_elapsed_ms: 1000,
        };

        let mut attempts = 0;
        let result = retry_fetch(&policy, "test_op", || {
            attempts += 1;
            let fail = attempts < 2;
            async move {
                if fail {
                    Err(FetchError::Status { status: 503 })
                } else {
                    Ok(7)
                }
            }
        })
        .await;

        assert_eq!(result.unwrap(), 7);
        assert_eq!(attempts, 2);
    }

    #[tokio::test]
    async fn test_retry_exhausts_attempts() {
        let policy = RetryPolicy {
            max_attempts: 3,
            base_delay_ms: 1,
            max_delay_ms: 5,
            max_elapsed_ms: 1000,
        };

        let mut attempts = 0;
        let result: Result<(), _> = retry_fetch(&policy, "test_op", || {
            attempts += 1;
            async { Err(FetchError::Status { status: 500 }) }
        })
        .await;

        assert!(result.is_err());
        assert_eq!(attempts, 3);
    }

    #[tokio::test]
    async fn test_non_retryable_fails_fast() {
        let policy = RetryPolicy::default();
        let mut attempts = 0;
        let result: Result<(), _> = retry_fetch(&policy, "test_op", || {
            attempts += 1;
            async { Err(FetchError::Status { status: 404 }) }
        })
        .await;

        assert!(result.is_err());
        assert_eq!(attempts, 1);
    }
}
