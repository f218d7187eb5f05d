//! Bounded retry with exponential backoff for transient failures.

use crate::error::Result;
use std::future::Future;
use std::time::Duration;

/// How many times, and how patiently, a failed call is retried.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    /// Retries after the first attempt (total attempts = `max_retries + 1`).
    pub max_retries: u32,
    /// Delay before the first retry.
    pub initial_delay: Duration,
    /// Factor applied to the delay after every retry.
    pub backoff_multiplier: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_delay: Duration::from_millis(1500),
            backoff_multiplier: 1.5,
        }
    }
}

impl RetryPolicy {
    /// A policy that never retries.
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            ..Self::default()
        }
    }

    /// Sets the number of retries.
    #[must_use]
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Sets the delay before the first retry.
    #[must_use]
    pub fn with_initial_delay(mut self, delay: Duration) -> Self {
        self.initial_delay = delay;
        self
    }

    /// Sets the backoff multiplier. Values below 1.0 are clamped to 1.0.
    #[must_use]
    pub fn with_backoff_multiplier(mut self, multiplier: f64) -> Self {
        self.backoff_multiplier = multiplier.max(1.0);
        self
    }

    /// Delay slept before retry number `retry` (zero-based).
    ///
    /// Saturates at `Duration::MAX` instead of overflowing.
    pub fn delay_for(&self, retry: u32) -> Duration {
        let exponent = i32::try_from(retry).unwrap_or(i32::MAX);
        let factor = self.backoff_multiplier.max(1.0).powi(exponent);
        scale(self.initial_delay, factor)
    }

    /// The full schedule of delays this policy may sleep through.
    pub fn delays(&self) -> Vec<Duration> {
        (0..self.max_retries).map(|i| self.delay_for(i)).collect()
    }
}

/// `delay * factor`, saturating at `Duration::MAX` on overflow or non-finite results.
fn scale(delay: Duration, factor: f64) -> Duration {
    Duration::try_from_secs_f64(delay.as_secs_f64() * factor).unwrap_or(Duration::MAX)
}

/// Runs `op`, retrying transient failures according to `policy`.
///
/// Success returns immediately. A terminal error, or any error once the
/// budget is spent, is returned unchanged. Between attempts the task sleeps
/// without blocking the runtime.
pub async fn with_retry<T, F, Fut>(policy: &RetryPolicy, mut op: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut retries_left = policy.max_retries;
    let mut delay = policy.initial_delay;
    let mut attempt: u32 = 1;

    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(e) if retries_left > 0 && e.is_transient() => {
                tracing::warn!(
                    attempt,
                    retries_left,
                    delay_ms = delay.as_millis() as u64,
                    "transient error, retrying: {e}"
                );
                tokio::time::sleep(delay).await;
                retries_left -= 1;
                delay = scale(delay, policy.backoff_multiplier.max(1.0));
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StudioError;
    use std::sync::atomic::{AtomicU32, Ordering};
    use tokio::time::Instant;

    fn transient() -> StudioError {
        StudioError::Api {
            status: 500,
            message: "INTERNAL: Rpc failed".into(),
        }
    }

    #[test]
    fn test_default_policy() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_retries, 3);
        assert_eq!(
            policy.delays(),
            vec![
                Duration::from_millis(1500),
                Duration::from_millis(2250),
                Duration::from_millis(3375),
            ]
        );
    }

    #[test]
    fn test_backoff_multiplier_clamped() {
        let policy = RetryPolicy::default().with_backoff_multiplier(0.2);
        assert_eq!(policy.backoff_multiplier, 1.0);
        assert_eq!(policy.delay_for(2), policy.initial_delay);
    }

    #[tokio::test(start_paused = true)]
    async fn test_succeeds_after_two_transient_failures() {
        let calls = &AtomicU32::new(0);
        let start = Instant::now();

        let result = with_retry(&RetryPolicy::default(), || async move {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            if n < 2 {
                Err(transient())
            } else {
                Ok("done")
            }
        })
        .await;

        assert_eq!(result.unwrap(), "done");
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        // Slept twice: 1500ms + 2250ms.
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_millis(3750), "{elapsed:?}");
        assert!(elapsed < Duration::from_millis(3760), "{elapsed:?}");
    }

    #[tokio::test(start_paused = true)]
    async fn test_transient_failures_exhaust_budget() {
        let calls = &AtomicU32::new(0);
        let start = Instant::now();
        let policy = RetryPolicy::default();

        let result: Result<()> = with_retry(&policy, || async move {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(transient())
        })
        .await;

        assert!(matches!(result, Err(StudioError::Api { status: 500, .. })));
        assert_eq!(calls.load(Ordering::SeqCst), policy.max_retries + 1);
        let expected: Duration = policy.delays().into_iter().sum();
        let elapsed = start.elapsed();
        assert!(elapsed >= expected, "{elapsed:?}");
        assert!(elapsed < expected + Duration::from_millis(10), "{elapsed:?}");
    }

    #[tokio::test(start_paused = true)]
    async fn test_terminal_error_is_not_retried() {
        let calls = &AtomicU32::new(0);
        let start = Instant::now();

        let result: Result<()> = with_retry(&RetryPolicy::default(), || async move {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(StudioError::Auth("API key not valid".into()))
        })
        .await;

        assert!(matches!(result, Err(StudioError::Auth(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_success_makes_single_call() {
        let calls = &AtomicU32::new(0);

        let result = with_retry(&RetryPolicy::default(), || async move {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok::<_, StudioError>(7)
        })
        .await;

        assert_eq!(result.unwrap(), 7);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_delays_saturate_instead_of_overflowing() {
        let delays = RetryPolicy::default().with_max_retries(200).delays();
        assert_eq!(delays.len(), 200);
        assert_eq!(delays[0], Duration::from_millis(1500));
        assert_eq!(delays[199], Duration::MAX);

        let policy = RetryPolicy::default().with_backoff_multiplier(1e20);
        assert_eq!(policy.delay_for(1), Duration::MAX);
    }

    #[tokio::test(start_paused = true)]
    async fn test_huge_multiplier_does_not_panic() {
        let calls = &AtomicU32::new(0);
        let policy = RetryPolicy::default()
            .with_max_retries(2)
            .with_backoff_multiplier(1e20);

        let result: Result<()> = with_retry(&policy, || async move {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(StudioError::Api {
                status: 503,
                message: "UNAVAILABLE: overloaded".into(),
            })
        })
        .await;

        assert!(matches!(result, Err(StudioError::Api { status: 503, .. })));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_retry_policy() {
        let calls = &AtomicU32::new(0);

        let result: Result<()> = with_retry(&RetryPolicy::none(), || async move {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(transient())
        })
        .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
