//! Polling wrapper for timing-dependent checks.
//!
//! The runner invokes each predicate exactly once and never retries. Checks
//! that race the cluster (a pod that is not Ready yet, an ArgoCD application
//! still syncing) wrap their predicate in [`Eventually`], which keeps polling
//! with exponential backoff until success or until its timeout runs out.

use crate::case::Outcome;
use crate::errors::PredicateError;
use crate::predicate::Predicate;
use std::time::Duration;
use tokio::time::{sleep, Instant};

/// Default first retry delay.
pub const DEFAULT_INITIAL_DELAY: Duration = Duration::from_millis(500);

/// Retries an inner predicate until it succeeds or the timeout elapses.
///
/// Backoff strategy:
/// - Initial delay: 500ms
/// - Exponential multiplier: 2x
/// - Delay capped at the time remaining
///
/// When the timeout is reached the last observed result is returned as-is,
/// so an execution error on the final attempt is still reported as an error.
pub struct Eventually<P> {
    inner: P,
    timeout: Duration,
    initial_delay: Duration,
}

impl<P: Predicate> Eventually<P> {
    pub fn new(inner: P, timeout: Duration) -> Self {
        Self {
            inner,
            timeout,
            initial_delay: DEFAULT_INITIAL_DELAY,
        }
    }

    #[must_use]
    pub fn with_initial_delay(mut self, delay: Duration) -> Self {
        self.initial_delay = delay;
        self
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

#[async_trait::async_trait]
impl<P: Predicate> Predicate for Eventually<P> {
    async fn check(&self) -> Result<Outcome, PredicateError> {
        let start = Instant::now();
        let mut delay = self.initial_delay;
        let mut attempts: u32 = 0;

        loop {
            attempts += 1;
            let result = self.inner.check().await;
            if matches!(result, Ok(Outcome::Success)) {
                return result;
            }

            let elapsed = start.elapsed();
            if elapsed >= self.timeout {
                tracing::debug!(
                    target: "validator.eventual",
                    predicate = %self.inner.describe(),
                    attempts,
                    timeout_ms = u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX),
                    "Condition not met within timeout"
                );
                return result;
            }

            sleep(delay).await;

            delay *= 2;

            let remaining = self.timeout.saturating_sub(elapsed);
            if delay > remaining {
                delay = remaining;
            }
        }
    }

    fn describe(&self) -> String {
        format!("eventually({:?}, {})", self.timeout, self.inner.describe())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::predicate::FnPredicate;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[tokio::test(start_paused = true)]
    async fn test_succeeds_immediately() {
        let calls = Arc::new(AtomicUsize::new(0));
        let calls_clone = Arc::clone(&calls);
        let predicate = Eventually::new(
            FnPredicate::new(move || {
                calls_clone.fetch_add(1, Ordering::SeqCst);
                true
            }),
            Duration::from_secs(10),
        );

        assert_eq!(predicate.check().await.unwrap(), Outcome::Success);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_succeeds_after_retry() {
        let attempts = Arc::new(AtomicUsize::new(0));
        let attempts_clone = Arc::clone(&attempts);
        let predicate = Eventually::new(
            FnPredicate::new(move || attempts_clone.fetch_add(1, Ordering::SeqCst) + 1 >= 3),
            Duration::from_secs(10),
        );

        assert_eq!(predicate.check().await.unwrap(), Outcome::Success);
        assert_eq!(attempts.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_reports_failure_on_timeout() {
        let attempts = Arc::new(AtomicUsize::new(0));
        let attempts_clone = Arc::clone(&attempts);
        let predicate = Eventually::new(
            FnPredicate::new(move || {
                attempts_clone.fetch_add(1, Ordering::SeqCst);
                false
            }),
            Duration::from_secs(2),
        );

        let started = Instant::now();
        assert_eq!(predicate.check().await.unwrap(), Outcome::Failure);
        assert!(started.elapsed() >= Duration::from_secs(2));
        assert!(attempts.load(Ordering::SeqCst) >= 2);
    }

    #[test]
    fn test_describe_wraps_inner() {
        let predicate = Eventually::new(FnPredicate::new(|| true), Duration::from_secs(30));
        assert_eq!(predicate.describe(), "eventually(30s, closure)");
    }
}
