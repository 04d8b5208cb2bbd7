//! Retry policy shared by every call that crosses the model-daemon boundary.

use std::future::Future;
use std::time::Duration;

use tracing::warn;

use super::LlmError;

/// Bounded retry with exponential backoff: `initial, 2×initial, 4×initial, …` capped at `max_backoff`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
}

impl Default for RetryPolicy {
    /// 3 attempts, 1s initial backoff, 8s cap.
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_backoff: Duration::from_secs(1),
            max_backoff: Duration::from_secs(8),
        }
    }
}

impl RetryPolicy {
    /// A policy that makes exactly one attempt.
    pub fn none() -> Self {
        Self {
            max_attempts: 1,
            ..Self::default()
        }
    }

    /// Delay before retry number `retry` (1-based).
    pub fn backoff(&self, retry: u32) -> Duration {
        let factor = 2u32.saturating_pow(retry.saturating_sub(1));
        self.initial_backoff
            .saturating_mul(factor)
            .min(self.max_backoff)
    }

    /// Runs `call` until it succeeds, fails with a non-transient error, or attempts run out.
    pub async fn run<T, F, Fut>(&self, operation: &str, mut call: F) -> Result<T, LlmError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, LlmError>>,
    {
        let mut last_error: Option<LlmError> = None;

        for attempt in 0..self.max_attempts {
            if attempt > 0 {
                let delay = self.backoff(attempt);
                warn!(
                    "{} attempt {} failed, retrying after {}ms...",
                    operation,
                    attempt,
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
            }

            match call().await {
                Ok(value) => return Ok(value),
                Err(e) if e.is_transient() => {
                    warn!("{} failed: {}", operation, e);
                    last_error = Some(e);
                }
                Err(e) => return Err(e),
            }
        }

        Err(last_error.unwrap_or(LlmError::RetriesExhausted {
            attempts: self.max_attempts,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[test]
    fn test_backoff_schedule_doubles_and_caps() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.backoff(1), Duration::from_secs(1));
        assert_eq!(policy.backoff(2), Duration::from_secs(2));
        assert_eq!(policy.backoff(3), Duration::from_secs(4));
        assert_eq!(policy.backoff(4), Duration::from_secs(8));
        assert_eq!(policy.backoff(10), Duration::from_secs(8));
        assert_eq!(policy.backoff(40), Duration::from_secs(8));
    }

    #[tokio::test(start_paused = true)]
    async fn test_succeeds_after_transient_failures() {
        let calls = AtomicU32::new(0);
        let result = RetryPolicy::default()
            .run("test call", || async {
                let n = calls.fetch_add(1, Ordering::SeqCst);
                if n < 2 {
                    Err(LlmError::EmptyContent)
                } else {
                    Ok(n)
                }
            })
            .await;
        assert_eq!(result.unwrap(), 2);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_returns_last_error_after_exhaustion() {
        let calls = AtomicU32::new(0);
        let result: Result<(), LlmError> = RetryPolicy::default()
            .run("test call", || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(LlmError::Api {
                    status: 503,
                    message: "down".to_string(),
                })
            })
            .await;
        assert!(matches!(result, Err(LlmError::Api { status: 503, .. })));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_non_transient_error_is_not_retried() {
        let calls = AtomicU32::new(0);
        let result: Result<(), LlmError> = RetryPolicy::default()
            .run("test call", || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(LlmError::Api {
                    status: 404,
                    message: "model not found".to_string(),
                })
            })
            .await;
        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_zero_attempts_reports_exhaustion() {
        let policy = RetryPolicy {
            max_attempts: 0,
            ..RetryPolicy::default()
        };
        let result: Result<(), LlmError> = policy.run("noop", || async { Ok(()) }).await;
        assert!(matches!(
            result,
            Err(LlmError::RetriesExhausted { attempts: 0 })
        ));
    }
}
