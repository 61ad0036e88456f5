//! Exponential backoff retry executor.
//!
//! Wraps a fallible async operation and re-invokes it up to
//! `max_attempts` times.  Before retry `n` (0-indexed) the executor calls
//! `on_retry` and then sleeps for exactly `base_delay * 2^n`:
//!
//! ```text
//! attempt 0 ─fail─▶ on_retry(e, 0, base)   ─sleep base──▶ attempt 1
//! attempt 1 ─fail─▶ on_retry(e, 1, base*2) ─sleep base*2▶ attempt 2
//! ...
//! attempt m-1 ─fail─▶ RetryError::Exhausted
//! ```
//!
//! Errors vetoed by `should_retry` come back as `RetryError::Fatal`
//! holding the original value untouched, after no delay at all.

use std::fmt::Display;
use std::future::Future;
use std::num::NonZeroU32;
use std::time::Duration;

use thiserror::Error;
use tokio_util::sync::CancellationToken;

use crate::config::Settings;

/// Default number of invocations (one attempt plus three retries).
pub const DEFAULT_MAX_ATTEMPTS: u32 = 4;

/// Default base delay before the first retry.
pub const DEFAULT_BASE_DELAY: Duration = Duration::from_millis(1000);

/// Default diagnostic name.
pub const DEFAULT_OPERATION: &str = "operation";

/// Outcome of a retried operation that did not succeed.
#[derive(Debug, Error)]
pub enum RetryError<E> {
    /// `should_retry` rejected the error.  The value is the caller's own
    /// error, unchanged.
    #[error("{0}")]
    Fatal(E),

    /// Every attempt failed with a retryable error.
    #[error("Retry exhausted for '{operation}' after {attempts} attempts: {last_error}")]
    Exhausted {
        operation: String,
        attempts: u32,
        last_error: E,
    },

    /// The cancellation token fired while waiting for the next attempt.
    #[error("'{operation}' cancelled after {attempts} attempts (last error: {last_error})")]
    Cancelled {
        operation: String,
        attempts: u32,
        last_error: E,
    },
}

impl<E> RetryError<E> {
    /// The underlying error from the last attempt.
    pub fn last_error(&self) -> &E {
        match self {
            RetryError::Fatal(e) => e,
            RetryError::Exhausted { last_error, .. } | RetryError::Cancelled { last_error, .. } => {
                last_error
            }
        }
    }

    /// Consume the wrapper and return the underlying error.
    pub fn into_inner(self) -> E {
        match self {
            RetryError::Fatal(e) => e,
            RetryError::Exhausted { last_error, .. } | RetryError::Cancelled { last_error, .. } => {
                last_error
            }
        }
    }

    /// Number of invocations of the wrapped operation, when known.
    pub fn attempts(&self) -> Option<u32> {
        match self {
            RetryError::Fatal(_) => None,
            RetryError::Exhausted { attempts, .. } | RetryError::Cancelled { attempts, .. } => {
                Some(*attempts)
            }
        }
    }
}

type ShouldRetry<'a, E> = Box<dyn Fn(&E, u32) -> bool + Send + Sync + 'a>;
type OnRetry<'a, E> = Box<dyn Fn(&E, u32, Duration) + Send + Sync + 'a>;

/// Per-call retry configuration.
///
/// Built with chained setters; every field has a default:
///
/// ```
/// use std::time::Duration;
/// use launchkey::retry::RetryPolicy;
///
/// let policy: RetryPolicy<'_, std::io::Error> = RetryPolicy::new("fetch-quote")
///     .max_attempts(3)
///     .base_delay(Duration::from_millis(100))
///     .should_retry(|e: &std::io::Error, _| e.kind() != std::io::ErrorKind::PermissionDenied);
/// assert_eq!(policy.get_max_attempts(), 3);
/// ```
pub struct RetryPolicy<'a, E> {
    max_attempts: NonZeroU32,
    base_delay: Duration,
    operation: String,
    should_retry: ShouldRetry<'a, E>,
    on_retry: OnRetry<'a, E>,
}

impl<E> Default for RetryPolicy<'_, E> {
    fn default() -> Self {
        Self::new(DEFAULT_OPERATION)
    }
}

impl<'a, E> RetryPolicy<'a, E> {
    /// Policy with default limits and the given diagnostic name.
    pub fn new(operation: impl Into<String>) -> Self {
        Self {
            max_attempts: NonZeroU32::new(DEFAULT_MAX_ATTEMPTS).unwrap_or(NonZeroU32::MIN),
            base_delay: DEFAULT_BASE_DELAY,
            operation: operation.into(),
            should_retry: Box::new(|_, _| true),
            on_retry: Box::new(|_, _, _| {}),
        }
    }

    /// Policy using the limits from `Settings`.
    pub fn from_settings(settings: &Settings, operation: impl Into<String>) -> Self {
        Self::new(operation)
            .max_attempts(settings.retry_max_attempts)
            .base_delay(Duration::from_millis(settings.retry_base_delay_ms))
    }

    /// Total number of invocations before giving up.  Values below 1
    /// are raised to 1.
    pub fn max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = NonZeroU32::new(attempts).unwrap_or(NonZeroU32::MIN);
        self
    }

    /// Delay before the first retry.  Must be positive; zero is raised
    /// to one millisecond.
    pub fn base_delay(mut self, delay: Duration) -> Self {
        self.base_delay = delay.max(Duration::from_millis(1));
        self
    }

    /// Classify errors: return `false` to fail immediately.
    pub fn should_retry<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&E, u32) -> bool + Send + Sync + 'a,
    {
        self.should_retry = Box::new(predicate);
        self
    }

    /// Observe each retry just before the backoff sleep.
    pub fn on_retry<F>(mut self, observer: F) -> Self
    where
        F: Fn(&E, u32, Duration) + Send + Sync + 'a,
    {
        self.on_retry = Box::new(observer);
        self
    }

    pub fn get_max_attempts(&self) -> u32 {
        self.max_attempts.get()
    }

    pub fn get_base_delay(&self) -> Duration {
        self.base_delay
    }

    pub fn operation(&self) -> &str {
        &self.operation
    }

    /// Delay before retry `retry_index` (0-indexed): `base_delay * 2^retry_index`.
    pub fn delay_for(&self, retry_index: u32) -> Duration {
        match 1u32.checked_shl(retry_index) {
            Some(factor) => self.base_delay.saturating_mul(factor),
            None => Duration::MAX,
        }
    }
}

/// What the loop does after a failed attempt.
enum Next<E> {
    Wait(E, Duration),
    Stop(RetryError<E>),
}

impl<E: Display> RetryPolicy<'_, E> {
    /// Classify a failure on attempt `attempt` and fire the observer hook.
    fn after_failure(&self, error: E, attempt: u32) -> Next<E> {
        let total = self.max_attempts.get();

        if !(self.should_retry)(&error, attempt) {
            tracing::error!(
                operation = %self.operation,
                attempt = attempt + 1,
                "non-retryable error: {error}"
            );
            return Next::Stop(RetryError::Fatal(error));
        }

        if attempt + 1 >= total {
            tracing::error!(
                operation = %self.operation,
                attempts = total,
                "giving up: {error}"
            );
            return Next::Stop(RetryError::Exhausted {
                operation: self.operation.clone(),
                attempts: total,
                last_error: error,
            });
        }

        let delay = self.delay_for(attempt);
        tracing::warn!(
            operation = %self.operation,
            "attempt {}/{} failed, retrying in {}ms: {error}",
            attempt + 1,
            total,
            delay.as_millis()
        );
        (self.on_retry)(&error, attempt, delay);
        Next::Wait(error, delay)
    }

    fn log_success(&self, attempt: u32) {
        if attempt > 0 {
            tracing::info!(
                operation = %self.operation,
                "succeeded on attempt {}",
                attempt + 1
            );
        }
    }
}

/// Run `op` with exponential backoff according to `policy`.
///
/// `op` is invoked at most `policy.max_attempts` times.  The sleep
/// between attempts suspends only the calling task.
pub async fn retry_with_backoff<T, E, F, Fut>(
    mut op: F,
    policy: &RetryPolicy<'_, E>,
) -> Result<T, RetryError<E>>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Display,
{
    let mut attempt = 0;
    loop {
        match op().await {
            Ok(value) => {
                policy.log_success(attempt);
                return Ok(value);
            }
            Err(error) => match policy.after_failure(error, attempt) {
                Next::Stop(err) => return Err(err),
                Next::Wait(_, delay) => tokio::time::sleep(delay).await,
            },
        }
        attempt += 1;
    }
}

/// Like [`retry_with_backoff`], but abandons the backoff sleep when
/// `cancel` fires.  An attempt already in flight is allowed to finish.
pub async fn retry_with_backoff_cancellable<T, E, F, Fut>(
    mut op: F,
    policy: &RetryPolicy<'_, E>,
    cancel: &CancellationToken,
) -> Result<T, RetryError<E>>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Display,
{
    let mut attempt = 0;
    loop {
        match op().await {
            Ok(value) => {
                policy.log_success(attempt);
                return Ok(value);
            }
            Err(error) => match policy.after_failure(error, attempt) {
                Next::Stop(err) => return Err(err),
                Next::Wait(error, delay) => {
                    tokio::select! {
                        _ = cancel.cancelled() => {
                            tracing::warn!(operation = %policy.operation, "retry cancelled");
                            return Err(RetryError::Cancelled {
                                operation: policy.operation.clone(),
                                attempts: attempt + 1,
                                last_error: error,
                            });
                        }
                        _ = tokio::time::sleep(delay) => {}
                    }
                }
            },
        }
        attempt += 1;
    }
}

/// Retry `op` up to `max_attempts` times with the default base delay.
pub async fn retry<T, E, F, Fut>(
    max_attempts: u32,
    op: F,
    operation: &str,
) -> Result<T, RetryError<E>>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Display,
{
    let policy = RetryPolicy::new(operation).max_attempts(max_attempts);
    retry_with_backoff(op, &policy).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let policy: RetryPolicy<'_, String> = RetryPolicy::default();
        assert_eq!(policy.get_max_attempts(), 4);
        assert_eq!(policy.get_base_delay(), Duration::from_millis(1000));
        assert_eq!(policy.operation(), "operation");
    }

    #[test]
    fn delay_doubles_per_retry() {
        let policy: RetryPolicy<'_, String> =
            RetryPolicy::new("t").base_delay(Duration::from_millis(100));
        assert_eq!(policy.delay_for(0), Duration::from_millis(100));
        assert_eq!(policy.delay_for(1), Duration::from_millis(200));
        assert_eq!(policy.delay_for(2), Duration::from_millis(400));
        assert_eq!(policy.delay_for(5), Duration::from_millis(3200));
    }

    #[test]
    fn delay_saturates_instead_of_overflowing() {
        let policy: RetryPolicy<'_, String> = RetryPolicy::new("t");
        assert_eq!(policy.delay_for(200), Duration::MAX);
    }

    #[test]
    fn zero_limits_are_raised() {
        let policy: RetryPolicy<'_, String> = RetryPolicy::new("t")
            .max_attempts(0)
            .base_delay(Duration::ZERO);
        assert_eq!(policy.get_max_attempts(), 1);
        assert_eq!(policy.get_base_delay(), Duration::from_millis(1));
    }

    #[test]
    fn into_inner_returns_last_error() {
        let err = RetryError::Exhausted {
            operation: "op".to_string(),
            attempts: 2,
            last_error: "boom".to_string(),
        };
        assert_eq!(err.attempts(), Some(2));
        assert_eq!(err.last_error(), "boom");
        assert_eq!(err.into_inner(), "boom");
    }
}
