//! Bounded retry executor with exponential backoff
//!
//! This module re-runs an arbitrary async operation under a fixed attempt
//! budget. The executor is agnostic to error semantics: it propagates the
//! operation's last error unmodified once the budget is exhausted, and leaves
//! classification to the caller. All retry state is a plain local counter per
//! invocation, so concurrent executions never interfere.

use std::future::Future;
use std::time::Duration;

use tokio::time::sleep;
use tracing::debug;

/// Configuration for one retry execution.
///
/// Constructed fresh per call site; the executor never shares mutable state
/// across invocations.
#[derive(Clone, Debug, PartialEq)]
pub struct RetryConfig {
    /// Maximum number of retries after the initial attempt. Default: 3.
    pub max_retries: u32,
    /// Delay before the first retry. Default: 1 second.
    pub base_delay: Duration,
    /// Factor by which the delay grows per failed attempt. Default: 2.0.
    pub backoff_multiplier: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_millis(1000),
            backoff_multiplier: 2.0,
        }
    }
}

impl RetryConfig {
    /// Creates a config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the maximum number of retries.
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Sets the base delay before the first retry.
    pub fn with_base_delay(mut self, base_delay: Duration) -> Self {
        self.base_delay = base_delay;
        self
    }

    /// Sets the backoff multiplier.
    pub fn with_backoff_multiplier(mut self, multiplier: f64) -> Self {
        self.backoff_multiplier = multiplier;
        self
    }
}

/// Observer for retry progress, injected instead of a raw closure so the
/// executor stays decoupled from any UI technology.
///
/// `on_retry` fires exactly once per failed non-final attempt, before the
/// backoff sleep. `attempt` is the 1-based retry ordinal; `max_attempts` is
/// the total attempt budget (`max_retries + 1`). It never fires after a
/// success or for the final failure.
pub trait RetryObserver<E> {
    /// Called when a failed attempt is about to be retried.
    fn on_retry(&mut self, attempt: u32, max_attempts: u32, error: &E);
}

/// Extended sink for callers that also want terminal outcomes and the
/// computed backoff delay, e.g. for progress text.
pub trait FeedbackSink<E> {
    /// Called when a failed attempt is about to be retried, with the delay
    /// that will be slept before the next attempt.
    fn on_retry(&mut self, attempt: u32, max_attempts: u32, delay: Duration, error: &E);
    /// Called once when the operation succeeds, with the number of attempts
    /// that were made.
    fn on_success(&mut self, attempts: u32);
    /// Called once when the attempt budget is exhausted, right before the
    /// final error is returned.
    fn on_exhausted(&mut self, attempts: u32, error: &E);
}

/// Observer that ignores all progress events.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl<E> RetryObserver<E> for NoopObserver {
    fn on_retry(&mut self, _attempt: u32, _max_attempts: u32, _error: &E) {}
}

/// Adapter turning a closure into a [`RetryObserver`].
#[derive(Debug)]
pub struct FnObserver<F>(F);

/// Wraps a closure as a retry observer, for callers that do not need a
/// dedicated sink type.
pub fn observer_fn<F>(f: F) -> FnObserver<F> {
    FnObserver(f)
}

impl<E, F> RetryObserver<E> for FnObserver<F>
where
    F: FnMut(u32, u32, &E),
{
    fn on_retry(&mut self, attempt: u32, max_attempts: u32, error: &E) {
        (self.0)(attempt, max_attempts, error);
    }
}

/// Outcome of a single attempt, made explicit instead of using errors as
/// control flow between "retry needed" and "permanently failed".
enum AttemptOutcome<T, E> {
    Completed(T),
    Retryable(E),
    Exhausted(E),
}

/// Bounded backoff executor.
///
/// Holds only immutable configuration; every `run_*` call owns its own
/// attempt counter, so a single policy value can serve any number of
/// concurrent executions.
#[derive(Clone, Debug, Default)]
pub struct RetryPolicy {
    config: RetryConfig,
}

impl RetryPolicy {
    /// Creates a policy from the given configuration.
    pub fn new(config: RetryConfig) -> Self {
        Self { config }
    }

    /// Returns the configuration.
    pub fn config(&self) -> &RetryConfig {
        &self.config
    }

    /// Computes the backoff delay after the n-th failed attempt (0-based):
    /// `base_delay * backoff_multiplier^n`, saturating on overflow.
    pub fn delay_for(&self, failed_attempt: u32) -> Duration {
        let base_millis = self.config.base_delay.as_millis() as f64;
        let exponent = failed_attempt.min(i32::MAX as u32) as i32;
        let millis = base_millis * self.config.backoff_multiplier.powi(exponent);
        if millis.is_finite() && millis < u64::MAX as f64 {
            Duration::from_millis(millis.max(0.0) as u64)
        } else {
            Duration::from_millis(u64::MAX)
        }
    }

    fn outcome_for<T, E>(&self, result: Result<T, E>, failed_attempt: u32) -> AttemptOutcome<T, E> {
        match result {
            Ok(value) => AttemptOutcome::Completed(value),
            Err(error) if failed_attempt < self.config.max_retries => {
                AttemptOutcome::Retryable(error)
            }
            Err(error) => AttemptOutcome::Exhausted(error),
        }
    }

    /// Runs the operation under the attempt budget without progress
    /// reporting. See [`RetryPolicy::run_observed`] for the full contract.
    pub async fn run<T, E, F, Fut>(&self, operation: F) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        self.run_observed(operation, &mut NoopObserver).await
    }

    /// Runs the operation under the attempt budget.
    ///
    /// The initial attempt happens immediately. On failure with budget
    /// remaining, the observer is notified, the backoff delay is slept, and
    /// the operation is re-invoked. When every attempt fails, exactly
    /// `max_retries + 1` attempts are made and the error from the final
    /// attempt is returned unmodified.
    pub async fn run_observed<T, E, F, Fut, O>(
        &self,
        mut operation: F,
        observer: &mut O,
    ) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        O: RetryObserver<E> + ?Sized,
    {
        let max_attempts = self.config.max_retries + 1;
        let mut attempt: u32 = 0;
        loop {
            match self.outcome_for(operation().await, attempt) {
                AttemptOutcome::Completed(value) => return Ok(value),
                AttemptOutcome::Exhausted(error) => return Err(error),
                AttemptOutcome::Retryable(error) => {
                    let delay = self.delay_for(attempt);
                    observer.on_retry(attempt + 1, max_attempts, &error);
                    debug!(
                        attempt = attempt + 1,
                        max_attempts,
                        delay_ms = delay.as_millis() as u64,
                        "retrying after failed attempt"
                    );
                    sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }

    /// Runs the operation with full progress feedback: per-retry events with
    /// the computed delay, plus a terminal success or exhaustion event. The
    /// attempt/backoff contract is identical to [`RetryPolicy::run_observed`].
    pub async fn run_with_feedback<T, E, F, Fut, S>(
        &self,
        mut operation: F,
        sink: &mut S,
    ) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        S: FeedbackSink<E> + ?Sized,
    {
        let max_attempts = self.config.max_retries + 1;
        let mut attempt: u32 = 0;
        loop {
            match self.outcome_for(operation().await, attempt) {
                AttemptOutcome::Completed(value) => {
                    sink.on_success(attempt + 1);
                    return Ok(value);
                }
                AttemptOutcome::Exhausted(error) => {
                    sink.on_exhausted(attempt + 1, &error);
                    return Err(error);
                }
                AttemptOutcome::Retryable(error) => {
                    let delay = self.delay_for(attempt);
                    sink.on_retry(attempt + 1, max_attempts, delay, &error);
                    sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    use crate::error::RawError;

    fn fast_policy(max_retries: u32) -> RetryPolicy {
        RetryPolicy::new(
            RetryConfig::new()
                .with_max_retries(max_retries)
                .with_base_delay(Duration::from_millis(1))
                .with_backoff_multiplier(2.0),
        )
    }

    #[derive(Default)]
    struct RecordingObserver {
        calls: Vec<(u32, u32)>,
    }

    impl RetryObserver<RawError> for RecordingObserver {
        fn on_retry(&mut self, attempt: u32, max_attempts: u32, _error: &RawError) {
            self.calls.push((attempt, max_attempts));
        }
    }

    #[derive(Default)]
    struct RecordingSink {
        retries: Vec<(u32, u32, Duration)>,
        success: Option<u32>,
        exhausted: Option<u32>,
    }

    impl FeedbackSink<RawError> for RecordingSink {
        fn on_retry(&mut self, attempt: u32, max_attempts: u32, delay: Duration, _error: &RawError) {
            self.retries.push((attempt, max_attempts, delay));
        }
        fn on_success(&mut self, attempts: u32) {
            self.success = Some(attempts);
        }
        fn on_exhausted(&mut self, attempts: u32, _error: &RawError) {
            self.exhausted = Some(attempts);
        }
    }

    #[test]
    fn test_config_defaults() {
        let config = RetryConfig::default();
        assert_eq!(config.max_retries, 3);
        assert_eq!(config.base_delay, Duration::from_millis(1000));
        assert_eq!(config.backoff_multiplier, 2.0);
    }

    #[test]
    fn test_config_builder() {
        let config = RetryConfig::new()
            .with_max_retries(5)
            .with_base_delay(Duration::from_millis(250))
            .with_backoff_multiplier(1.5);
        assert_eq!(config.max_retries, 5);
        assert_eq!(config.base_delay, Duration::from_millis(250));
        assert_eq!(config.backoff_multiplier, 1.5);
    }

    #[test]
    fn test_delay_is_geometric() {
        let policy = RetryPolicy::new(RetryConfig::default());
        assert_eq!(policy.delay_for(0), Duration::from_millis(1000));
        assert_eq!(policy.delay_for(1), Duration::from_millis(2000));
        assert_eq!(policy.delay_for(2), Duration::from_millis(4000));
        assert_eq!(policy.delay_for(3), Duration::from_millis(8000));
    }

    #[test]
    fn test_delay_fractional_multiplier() {
        let policy = RetryPolicy::new(
            RetryConfig::new()
                .with_base_delay(Duration::from_millis(1000))
                .with_backoff_multiplier(1.5),
        );
        assert_eq!(policy.delay_for(0), Duration::from_millis(1000));
        assert_eq!(policy.delay_for(1), Duration::from_millis(1500));
        assert_eq!(policy.delay_for(2), Duration::from_millis(2250));
    }

    #[test]
    fn test_delay_saturates_on_huge_exponents() {
        let policy = RetryPolicy::new(RetryConfig::default());
        // Must not panic or wrap
        let delay = policy.delay_for(u32::MAX);
        assert!(delay >= Duration::from_millis(1000));
    }

    #[tokio::test]
    async fn test_all_attempts_fail() {
        let policy = fast_policy(2);
        let calls = Arc::new(AtomicU32::new(0));
        let mut observer = RecordingObserver::default();

        let counter = calls.clone();
        let result: Result<(), RawError> = policy
            .run_observed(
                move || {
                    let counter = counter.clone();
                    async move {
                        counter.fetch_add(1, Ordering::SeqCst);
                        Err(RawError::new("network down"))
                    }
                },
                &mut observer,
            )
            .await;

        // max_retries + 1 attempts, observer fires max_retries times
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert_eq!(observer.calls, vec![(1, 3), (2, 3)]);
        // Last error is propagated unmodified
        assert_eq!(result.unwrap_err(), RawError::new("network down"));
    }

    #[tokio::test]
    async fn test_fail_then_succeed() {
        let policy = fast_policy(3);
        let calls = Arc::new(AtomicU32::new(0));
        let mut observer = RecordingObserver::default();

        let counter = calls.clone();
        let result: Result<&str, RawError> = policy
            .run_observed(
                move || {
                    let counter = counter.clone();
                    async move {
                        if counter.fetch_add(1, Ordering::SeqCst) < 2 {
                            Err(RawError::new("flaky"))
                        } else {
                            Ok("uploaded")
                        }
                    }
                },
                &mut observer,
            )
            .await;

        assert_eq!(result.unwrap(), "uploaded");
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert_eq!(observer.calls.len(), 2);
    }

    #[tokio::test]
    async fn test_immediate_success_makes_one_attempt() {
        let policy = fast_policy(3);
        let calls = Arc::new(AtomicU32::new(0));
        let mut observer = RecordingObserver::default();

        let counter = calls.clone();
        let result: Result<u32, RawError> = policy
            .run_observed(
                move || {
                    let counter = counter.clone();
                    async move {
                        counter.fetch_add(1, Ordering::SeqCst);
                        Ok(42)
                    }
                },
                &mut observer,
            )
            .await;

        assert_eq!(result.unwrap(), 42);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(observer.calls.is_empty());
    }

    #[tokio::test]
    async fn test_zero_retries_means_single_attempt() {
        let policy = fast_policy(0);
        let calls = Arc::new(AtomicU32::new(0));
        let mut observer = RecordingObserver::default();

        let counter = calls.clone();
        let result: Result<(), RawError> = policy
            .run_observed(
                move || {
                    let counter = counter.clone();
                    async move {
                        counter.fetch_add(1, Ordering::SeqCst);
                        Err(RawError::new("nope"))
                    }
                },
                &mut observer,
            )
            .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(observer.calls.is_empty());
    }

    #[tokio::test]
    async fn test_run_without_observer() {
        let policy = fast_policy(1);
        let calls = Arc::new(AtomicU32::new(0));

        let counter = calls.clone();
        let result: Result<(), RawError> = policy
            .run(move || {
                let counter = counter.clone();
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Err(RawError::new("down"))
                }
            })
            .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_observer_fn_adapter() {
        let policy = fast_policy(2);
        let mut seen = Vec::new();
        let mut observer = observer_fn(|attempt: u32, max_attempts: u32, _e: &RawError| {
            seen.push((attempt, max_attempts));
        });

        let result: Result<(), RawError> = policy
            .run_observed(
                || async { Err(RawError::new("down")) },
                &mut observer,
            )
            .await;
        drop(observer);

        assert!(result.is_err());
        assert_eq!(seen, vec![(1, 3), (2, 3)]);
    }

    #[tokio::test]
    async fn test_feedback_sink_exhaustion() {
        let policy = fast_policy(2);
        let mut sink = RecordingSink::default();

        let result: Result<(), RawError> = policy
            .run_with_feedback(|| async { Err(RawError::new("down")) }, &mut sink)
            .await;

        assert!(result.is_err());
        assert_eq!(sink.retries.len(), 2);
        assert_eq!(sink.retries[0].2, Duration::from_millis(1));
        assert_eq!(sink.retries[1].2, Duration::from_millis(2));
        assert_eq!(sink.exhausted, Some(3));
        assert!(sink.success.is_none());
    }

    #[tokio::test]
    async fn test_feedback_sink_success() {
        let policy = fast_policy(3);
        let mut sink = RecordingSink::default();
        let calls = Arc::new(AtomicU32::new(0));

        let counter = calls.clone();
        let result: Result<&str, RawError> = policy
            .run_with_feedback(
                move || {
                    let counter = counter.clone();
                    async move {
                        if counter.fetch_add(1, Ordering::SeqCst) == 0 {
                            Err(RawError::new("flaky"))
                        } else {
                            Ok("done")
                        }
                    }
                },
                &mut sink,
            )
            .await;

        assert_eq!(result.unwrap(), "done");
        assert_eq!(sink.retries.len(), 1);
        assert_eq!(sink.success, Some(2));
        assert!(sink.exhausted.is_none());
    }

    #[tokio::test]
    async fn test_concurrent_runs_do_not_share_counters() {
        let policy = Arc::new(fast_policy(2));
        let calls_a = Arc::new(AtomicU32::new(0));
        let calls_b = Arc::new(AtomicU32::new(0));

        let pa = policy.clone();
        let ca = calls_a.clone();
        let a = tokio::spawn(async move {
            let _: Result<(), RawError> = pa
                .run(move || {
                    let ca = ca.clone();
                    async move {
                        ca.fetch_add(1, Ordering::SeqCst);
                        Err(RawError::new("a"))
                    }
                })
                .await;
        });

        let pb = policy.clone();
        let cb = calls_b.clone();
        let b = tokio::spawn(async move {
            let _: Result<(), RawError> = pb
                .run(move || {
                    let cb = cb.clone();
                    async move {
                        cb.fetch_add(1, Ordering::SeqCst);
                        Err(RawError::new("b"))
                    }
                })
                .await;
        });

        a.await.unwrap();
        b.await.unwrap();

        // Each execution owns its own budget of max_retries + 1 attempts
        assert_eq!(calls_a.load(Ordering::SeqCst), 3);
        assert_eq!(calls_b.load(Ordering::SeqCst), 3);
    }
}
