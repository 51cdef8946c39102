//! Bounded retry with exponential backoff for provider calls.
//!
//! One policy applies to every flow: exponential backoff (base 1s, factor 2,
//! capped at 8s) with at most three attempts. Transient errors
//! ([`ProviderError::retryable`]) wait and retry; fatal errors abort on the
//! first occurrence. Exhaustion is an ordinary outcome, not a panic: callers
//! receive a sentinel and substitute their documented fallback.

use std::future::Future;
use std::time::Duration;

use crate::provider::ProviderError;

/// Backoff strategy between retry attempts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Backoff {
    /// Fixed delay between attempts.
    Fixed { delay: Duration },
    /// Exponential delay: `base * (factor ^ attempt)`, capped at `max`,
    /// with optional +/- 50% jitter.
    Exponential {
        base: Duration,
        factor: f64,
        max: Duration,
        jitter: bool,
    },
}

impl Default for Backoff {
    fn default() -> Self {
        Self::Exponential {
            base: Duration::from_secs(1),
            factor: 2.0,
            max: Duration::from_secs(8),
            jitter: true,
        }
    }
}

impl Backoff {
    /// Delay before retry attempt `attempt` (0-based: the wait after the
    /// first failure uses `attempt = 0`).
    pub fn delay(self, attempt: u32) -> Duration {
        match self {
            Self::Fixed { delay } => delay,
            Self::Exponential {
                base,
                factor,
                max,
                jitter,
            } => {
                let scale = factor.powi(attempt as i32);
                let seconds = base.as_secs_f64() * scale;
                let capped = Duration::from_secs_f64(seconds.min(max.as_secs_f64()));

                if jitter {
                    let jitter_ms = (capped.as_millis() as f64 * 0.5) as u64;
                    let offset = fastrand::u64(0..=(jitter_ms * 2));
                    let total_ms = capped.as_millis() as i64 + (offset as i64 - jitter_ms as i64);
                    Duration::from_millis(total_ms.max(0) as u64)
                } else {
                    capped
                }
            }
        }
    }
}

/// Retry policy for one flow invocation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    /// Total attempts, including the first. Must be at least 1.
    pub max_attempts: u32,
    pub backoff: Backoff,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff: Backoff::default(),
        }
    }
}

impl RetryPolicy {
    /// Fast deterministic policy for tests: no jitter, millisecond waits.
    pub fn fast() -> Self {
        Self {
            max_attempts: 3,
            backoff: Backoff::Fixed {
                delay: Duration::from_millis(1),
            },
        }
    }

    pub fn no_retry() -> Self {
        Self {
            max_attempts: 1,
            backoff: Backoff::default(),
        }
    }
}

/// Terminal states of one retried invocation.
///
/// The state machine is `Idle -> Attempting -> {Success, RetryWait ->
/// Attempting, Fatal, Exhausted}`; this enum captures the three terminal
/// states together with how many attempts were spent reaching them.
#[derive(Debug, Clone, PartialEq)]
pub enum RetryOutcome<T> {
    Success { value: T, attempts: u32 },
    Fatal { error: ProviderError, attempts: u32 },
    Exhausted { last_error: ProviderError, attempts: u32 },
}

impl<T> RetryOutcome<T> {
    pub fn attempts(&self) -> u32 {
        match self {
            Self::Success { attempts, .. }
            | Self::Fatal { attempts, .. }
            | Self::Exhausted { attempts, .. } => *attempts,
        }
    }

    pub fn into_value(self) -> Option<T> {
        match self {
            Self::Success { value, .. } => Some(value),
            Self::Fatal { .. } | Self::Exhausted { .. } => None,
        }
    }

    pub fn error(&self) -> Option<&ProviderError> {
        match self {
            Self::Success { .. } => None,
            Self::Fatal { error, .. } => Some(error),
            Self::Exhausted { last_error, .. } => Some(last_error),
        }
    }
}

/// Drive `operation` through the retry state machine.
///
/// The attempt counter is created fresh per invocation and dropped with it;
/// nothing persists across calls. The closure receives the 1-based attempt
/// number, mainly for logging.
pub async fn run_with_retry<T, F, Fut>(policy: &RetryPolicy, mut operation: F) -> RetryOutcome<T>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, ProviderError>>,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 0_u32;

    loop {
        attempt += 1;

        match operation(attempt).await {
            Ok(value) => {
                return RetryOutcome::Success {
                    value,
                    attempts: attempt,
                };
            }
            Err(error) if !error.retryable() => {
                tracing::debug!(
                    attempt,
                    code = error.code(),
                    "provider call failed fatally; not retrying"
                );
                return RetryOutcome::Fatal {
                    error,
                    attempts: attempt,
                };
            }
            Err(error) => {
                if attempt >= max_attempts {
                    tracing::warn!(
                        attempts = attempt,
                        code = error.code(),
                        "provider retries exhausted"
                    );
                    return RetryOutcome::Exhausted {
                        last_error: error,
                        attempts: attempt,
                    };
                }

                let delay = policy.backoff.delay(attempt - 1);
                tracing::debug!(
                    attempt,
                    code = error.code(),
                    delay_ms = delay.as_millis() as u64,
                    "transient provider failure; backing off"
                );
                tokio::time::sleep(delay).await;
            }
        }
    }
}
