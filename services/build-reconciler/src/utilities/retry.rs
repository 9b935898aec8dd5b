use std::{future::Future, time::Duration};

use serde::Deserialize;
use tracing::warn;

use crate::error::AppError;

/// Bounded retry with capped exponential backoff for conflicting writes.
#[derive(Deserialize, Clone, Debug, PartialEq)]
pub struct RetryPolicy {
    #[serde(default = "max_attempts_default")]
    pub max_attempts: u32,
    #[serde(default = "initial_backoff_ms_default")]
    pub initial_backoff_ms: u64,
    #[serde(default = "max_backoff_ms_default")]
    pub max_backoff_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: max_attempts_default(),
            initial_backoff_ms: initial_backoff_ms_default(),
            max_backoff_ms: max_backoff_ms_default(),
        }
    }
}

fn max_attempts_default() -> u32 {
    5
}

fn initial_backoff_ms_default() -> u64 {
    10
}

fn max_backoff_ms_default() -> u64 {
    1000
}

impl RetryPolicy {
    /// Delay after the given failed attempt (1-based).
    pub fn backoff(&self, attempt: u32) -> Duration {
        let factor = 2u64.saturating_pow(attempt.saturating_sub(1));
        Duration::from_millis(
            self.initial_backoff_ms
                .saturating_mul(factor)
                .min(self.max_backoff_ms),
        )
    }
}

/// Runs `operation` until it stops failing with [`AppError::Conflict`] or the
/// policy's attempts are used up. Any other outcome is returned as is.
pub async fn retry_on_conflict<T, F, Fut>(
    policy: &RetryPolicy,
    mut operation: F,
) -> Result<T, AppError>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, AppError>>,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 1;

    loop {
        match operation(attempt).await {
            Err(AppError::Conflict(message)) if attempt < max_attempts => {
                let delay = policy.backoff(attempt);
                warn!(
                    attempt,
                    max_attempts,
                    delay_ms = delay.as_millis() as u64,
                    message = %message,
                    "⚠️ Write conflict, retrying"
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(AppError::Conflict(_)) => {
                return Err(AppError::StatusUpdateConflict { attempts: attempt });
            }
            other => return other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn fast_policy(max_attempts: u32) -> RetryPolicy {
        RetryPolicy {
            max_attempts,
            initial_backoff_ms: 0,
            max_backoff_ms: 0,
        }
    }

    #[test]
    fn test_backoff_doubles_and_caps() {
        let policy = RetryPolicy::default();

        assert_eq!(policy.backoff(1), Duration::from_millis(10));
        assert_eq!(policy.backoff(2), Duration::from_millis(20));
        assert_eq!(policy.backoff(4), Duration::from_millis(80));
        assert_eq!(policy.backoff(20), Duration::from_millis(1000));
        assert_eq!(policy.backoff(u32::MAX), Duration::from_millis(1000));
    }

    #[tokio::test]
    async fn test_conflicts_are_retried_until_success() {
        let calls = AtomicU32::new(0);

        let result = retry_on_conflict(&fast_policy(5), |attempt| {
            calls.fetch_add(1, Ordering::SeqCst);
            async move {
                if attempt < 3 {
                    Err(AppError::Conflict("stale resourceVersion".into()))
                } else {
                    Ok(attempt)
                }
            }
        })
        .await;

        assert_eq!(result.unwrap(), 3);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_exhaustion_reports_attempts() {
        let result: Result<(), AppError> = retry_on_conflict(&fast_policy(4), |_| async {
            Err(AppError::Conflict("stale resourceVersion".into()))
        })
        .await;

        assert!(matches!(
            result,
            Err(AppError::StatusUpdateConflict { attempts: 4 })
        ));
    }

    #[tokio::test]
    async fn test_other_errors_are_not_retried() {
        let calls = AtomicU32::new(0);

        let result: Result<(), AppError> = retry_on_conflict(&fast_policy(5), |_| {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(AppError::InternalServerError("forbidden".into())) }
        })
        .await;

        assert!(matches!(result, Err(AppError::InternalServerError(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_zero_attempts_still_tries_once() {
        let result = retry_on_conflict(&fast_policy(0), |_| async { Ok::<_, AppError>("done") }).await;

        assert_eq!(result.unwrap(), "done");
    }
}
