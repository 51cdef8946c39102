//! Admission gate in front of the completion provider.
//!
//! Concurrent flow invocations would otherwise map 1:1 onto concurrent
//! provider calls. The gate enforces a request quota per window and hands
//! back a recommended wait when the budget is spent; the orchestrator sleeps
//! that wait once and then proceeds rather than queueing indefinitely.

use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

use governor::clock::DefaultClock;
use governor::state::direct::NotKeyed;
use governor::state::InMemoryState;
use governor::{Quota, RateLimiter};

type DirectRateLimiter = RateLimiter<NotKeyed, InMemoryState, DefaultClock>;

/// Quota configuration for the gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdmissionPolicy {
    pub quota_window: Duration,
    pub quota_limit: u32,
    /// Upper bound on the single wait the orchestrator will honor.
    pub max_wait: Duration,
}

impl Default for AdmissionPolicy {
    fn default() -> Self {
        Self {
            quota_window: Duration::from_secs(60),
            quota_limit: 60,
            max_wait: Duration::from_secs(2),
        }
    }
}

/// Rate-quota gate shared by all invocations against one provider.
#[derive(Clone)]
pub struct AdmissionGate {
    limiter: Arc<DirectRateLimiter>,
    policy: AdmissionPolicy,
}

impl AdmissionGate {
    pub fn new(policy: AdmissionPolicy) -> Self {
        Self {
            limiter: Arc::new(RateLimiter::direct(quota_from_policy(&policy))),
            policy,
        }
    }

    /// Try to take one unit of rate budget.
    ///
    /// Returns the recommended wait (one refill period, capped at
    /// `max_wait`) when the budget is currently spent.
    pub fn check(&self) -> Result<(), Duration> {
        if self.limiter.check().is_ok() {
            return Ok(());
        }

        Err(refill_period(&self.policy).min(self.policy.max_wait))
    }

    /// Admit one call, sleeping at most one recommended wait.
    pub async fn admit(&self) {
        if let Err(wait) = self.check() {
            tracing::debug!(wait_ms = wait.as_millis() as u64, "admission gate full; waiting");
            tokio::time::sleep(wait).await;
        }
    }

    pub const fn policy(&self) -> AdmissionPolicy {
        self.policy
    }
}

impl Default for AdmissionGate {
    fn default() -> Self {
        Self::new(AdmissionPolicy::default())
    }
}

fn refill_period(policy: &AdmissionPolicy) -> Duration {
    let safe_limit = policy.quota_limit.max(1);
    let seconds_per_cell = (policy.quota_window.as_secs_f64() / f64::from(safe_limit)).max(0.001);
    Duration::from_secs_f64(seconds_per_cell)
}

fn quota_from_policy(policy: &AdmissionPolicy) -> Quota {
    let safe_limit = policy.quota_limit.max(1);
    let burst = NonZeroU32::new(safe_limit).expect("safe limit must be non-zero");

    Quota::with_period(refill_period(policy))
        .expect("period is always greater than zero")
        .allow_burst(burst)
}
