//! Circuit breaker guarding the completion provider.
//!
//! Tracks consecutive infrastructure failures and stops issuing upstream
//! calls once a threshold is crossed. After a cooldown the breaker admits a
//! single probe; the probe's outcome decides whether the circuit closes
//! again or re-opens for another cooldown.

use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Observable breaker state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BreakerState {
    Closed,
    Open,
    HalfOpen,
}

/// Thresholds and timers for one breaker instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BreakerConfig {
    /// Consecutive failures that open the circuit.
    pub trip_after: u32,
    /// How long the circuit stays open before admitting a probe.
    pub cooldown: Duration,
}

impl Default for BreakerConfig {
    fn default() -> Self {
        Self {
            trip_after: 3,
            cooldown: Duration::from_secs(30),
        }
    }
}

/// Error returned when the circuit refuses a call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CircuitOpen {
    /// Time remaining until the next probe is admitted.
    pub retry_in: Duration,
}

#[derive(Debug)]
struct BreakerInner {
    state: BreakerState,
    consecutive_failures: u32,
    opened_at: Option<Instant>,
}

/// Thread-safe consecutive-failure circuit breaker.
#[derive(Debug)]
pub struct CircuitBreaker {
    config: BreakerConfig,
    inner: Mutex<BreakerInner>,
}

impl Default for CircuitBreaker {
    fn default() -> Self {
        Self::new(BreakerConfig::default())
    }
}

impl CircuitBreaker {
    pub fn new(config: BreakerConfig) -> Self {
        Self {
            config,
            inner: Mutex::new(BreakerInner {
                state: BreakerState::Closed,
                consecutive_failures: 0,
                opened_at: None,
            }),
        }
    }

    /// Ask permission to issue one upstream call.
    ///
    /// While open, returns [`CircuitOpen`] with the remaining cooldown.
    /// Once the cooldown elapses the breaker moves to half-open and admits
    /// the caller as a probe.
    pub fn try_acquire(&self) -> Result<(), CircuitOpen> {
        let mut inner = self.lock();
        match inner.state {
            BreakerState::Closed | BreakerState::HalfOpen => Ok(()),
            BreakerState::Open => {
                let elapsed = inner
                    .opened_at
                    .map(|at| at.elapsed())
                    .unwrap_or(Duration::ZERO);

                if elapsed >= self.config.cooldown {
                    inner.state = BreakerState::HalfOpen;
                    inner.opened_at = None;
                    tracing::debug!("circuit breaker admitting half-open probe");
                    Ok(())
                } else {
                    Err(CircuitOpen {
                        retry_in: self.config.cooldown - elapsed,
                    })
                }
            }
        }
    }

    /// Record a successful upstream call; closes the circuit.
    pub fn on_success(&self) {
        let mut inner = self.lock();
        inner.state = BreakerState::Closed;
        inner.consecutive_failures = 0;
        inner.opened_at = None;
    }

    /// Record a failed upstream call.
    ///
    /// A half-open probe failure re-opens immediately; in the closed state
    /// the circuit opens once the consecutive-failure threshold is reached.
    pub fn on_failure(&self) {
        let mut inner = self.lock();
        inner.consecutive_failures = inner.consecutive_failures.saturating_add(1);

        let should_open = inner.state == BreakerState::HalfOpen
            || inner.consecutive_failures >= self.config.trip_after;

        if should_open && inner.state != BreakerState::Open {
            inner.state = BreakerState::Open;
            inner.opened_at = Some(Instant::now());
            tracing::warn!(
                failures = inner.consecutive_failures,
                cooldown_secs = self.config.cooldown.as_secs(),
                "circuit breaker opened"
            );
        }
    }

    pub fn state(&self) -> BreakerState {
        self.lock().state
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, BreakerInner> {
        self.inner
            .lock()
            .expect("circuit breaker lock is not poisoned")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opens_after_threshold_failures() {
        let breaker = CircuitBreaker::new(BreakerConfig {
            trip_after: 2,
            cooldown: Duration::from_secs(60),
        });

        breaker.on_failure();
        assert_eq!(breaker.state(), BreakerState::Closed);
        breaker.on_failure();
        assert_eq!(breaker.state(), BreakerState::Open);

        let refused = breaker.try_acquire().expect_err("open circuit refuses");
        assert!(refused.retry_in <= Duration::from_secs(60));
    }

    #[test]
    fn probe_after_cooldown_then_close_on_success() {
        let breaker = CircuitBreaker::new(BreakerConfig {
            trip_after: 1,
            cooldown: Duration::from_millis(1),
        });

        breaker.on_failure();
        assert_eq!(breaker.state(), BreakerState::Open);

        std::thread::sleep(Duration::from_millis(2));
        breaker.try_acquire().expect("cooldown elapsed; probe admitted");
        assert_eq!(breaker.state(), BreakerState::HalfOpen);

        breaker.on_success();
        assert_eq!(breaker.state(), BreakerState::Closed);
    }

    #[test]
    fn failed_probe_reopens_immediately() {
        let breaker = CircuitBreaker::new(BreakerConfig {
            trip_after: 1,
            cooldown: Duration::from_millis(1),
        });

        breaker.on_failure();
        std::thread::sleep(Duration::from_millis(2));
        breaker.try_acquire().expect("probe admitted");

        breaker.on_failure();
        assert_eq!(breaker.state(), BreakerState::Open);
    }
}
