//! Retry combinator
//!
//! Every blocking external call that is allowed to retry goes through
//! [`retry`]. Whether an error may be retried is decided by the error type
//! itself via [`Retryable`]; how long to wait and how often is decided by
//! the caller's [`RetryPolicy`].

use std::fmt;
use std::future::Future;
use wlsync_types::RetryPolicy;

/// Classifies errors into transient and permanent.
pub trait Retryable {
    fn is_retryable(&self) -> bool;
}

/// Run `op` until it succeeds, fails permanently, or the policy runs out.
///
/// Returns the last error when giving up.
pub async fn retry<T, E, F, Fut>(policy: &RetryPolicy, operation: &str, mut op: F) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Retryable + fmt::Display,
{
    let mut backoff = policy.backoff();
    let mut attempt: u32 = 1;

    loop {
        match op().await {
            Ok(value) => {
                if attempt > 1 {
                    tracing::info!(operation, attempt, "succeeded after retry");
                }
                return Ok(value);
            }
            Err(e) if !e.is_retryable() => return Err(e),
            Err(e) => match backoff.next() {
                Some(delay) => {
                    tracing::warn!(
                        operation,
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "attempt failed, retrying"
                    );
                    if !delay.is_zero() {
                        tokio::time::sleep(delay).await;
                    }
                    attempt = attempt.saturating_add(1);
                }
                None => {
                    tracing::error!(operation, attempt, error = %e, "giving up");
                    return Err(e);
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[derive(Debug)]
    enum TestError {
        Transient,
        Permanent,
    }

    impl fmt::Display for TestError {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "{self:?}")
        }
    }

    impl Retryable for TestError {
        fn is_retryable(&self) -> bool {
            matches!(self, TestError::Transient)
        }
    }

    #[tokio::test]
    async fn test_succeeds_after_transient_failures() {
        let counter = AtomicU32::new(0);
        let calls = &counter;
        let result = retry(&RetryPolicy::immediate(None), "test", move || async move {
            if calls.fetch_add(1, Ordering::SeqCst) < 3 {
                Err(TestError::Transient)
            } else {
                Ok(42)
            }
        })
        .await;

        assert_eq!(result.unwrap(), 42);
        assert_eq!(calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn test_bounded_policy_gives_up() {
        let counter = AtomicU32::new(0);
        let calls = &counter;
        let result: Result<(), _> = retry(&RetryPolicy::immediate(Some(3)), "test", move || async move {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(TestError::Transient)
        })
        .await;

        assert!(matches!(result, Err(TestError::Transient)));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_permanent_error_short_circuits() {
        let counter = AtomicU32::new(0);
        let calls = &counter;
        let result: Result<(), _> = retry(&RetryPolicy::immediate(None), "test", move || async move {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(TestError::Permanent)
        })
        .await;

        assert!(matches!(result, Err(TestError::Permanent)));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_waits_between_attempts() {
        let policy = RetryPolicy {
            max_attempts: Some(3),
            initial_delay_ms: 1_000,
            max_delay_ms: 10_000,
            multiplier: 2.0,
        };
        let started = tokio::time::Instant::now();
        let _: Result<(), _> = retry(&policy, "test", || async { Err(TestError::Transient) }).await;

        assert!(started.elapsed() >= std::time::Duration::from_millis(3_000));
    }
}
