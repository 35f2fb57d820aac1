//! Poll-interval policy driven by consecutive fetch failures.

use std::time::Duration;

/// Log failures 1 and 2, then every this-many failures.
const LOG_EVERY: u32 = 12;

/// Sleep schedule for the poll loop.
///
/// After a success the loop sleeps `interval`. After the `n`th consecutive
/// failure it sleeps `min(base + (n / failures_per_step) * step, cap)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackoffPolicy {
    pub interval: Duration,
    pub base: Duration,
    pub step: Duration,
    pub failures_per_step: u32,
    pub cap: Duration,
}

impl BackoffPolicy {
    /// Sleep after `failures` consecutive failures.
    #[must_use]
    pub fn delay_for(&self, failures: u32) -> Duration {
        let steps = failures / self.failures_per_step.max(1);
        self.step
            .checked_mul(steps)
            .and_then(|extra| self.base.checked_add(extra))
            .map_or(self.cap, |delay| delay.min(self.cap))
    }
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(5),
            base: Duration::from_secs(30),
            step: Duration::from_secs(15),
            failures_per_step: 6,
            cap: Duration::from_secs(120),
        }
    }
}

/// Consecutive failures since the last successful fetch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FailureState {
    pub consecutive_failures: u32,
}

/// Owns the [`FailureState`] and turns fetch results into sleep durations.
#[derive(Debug, Clone)]
pub struct BackoffController {
    policy: BackoffPolicy,
    state: FailureState,
}

impl BackoffController {
    #[must_use]
    pub fn new(policy: BackoffPolicy) -> Self {
        Self {
            policy,
            state: FailureState::default(),
        }
    }

    /// Reset the failure count; returns the regular poll interval.
    pub fn record_success(&mut self) -> Duration {
        self.state.consecutive_failures = 0;
        self.policy.interval
    }

    /// Count one more failure; returns how long to back off.
    pub fn record_failure(&mut self) -> Duration {
        self.state.consecutive_failures = self.state.consecutive_failures.saturating_add(1);
        self.policy.delay_for(self.state.consecutive_failures)
    }

    /// Whether the current failure should be logged.
    #[must_use]
    pub fn should_log(&self) -> bool {
        let n = self.state.consecutive_failures;
        n <= 2 || n % LOG_EVERY == 0
    }

    #[must_use]
    pub fn consecutive_failures(&self) -> u32 {
        self.state.consecutive_failures
    }

    #[must_use]
    pub fn state(&self) -> FailureState {
        self.state
    }

    #[must_use]
    pub fn policy(&self) -> &BackoffPolicy {
        &self.policy
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const fn secs(s: u64) -> Duration {
        Duration::from_secs(s)
    }

    #[test]
    fn first_five_failures_use_base() {
        let mut controller = BackoffController::new(BackoffPolicy::default());
        for _ in 1..=5 {
            assert_eq!(controller.record_failure(), secs(30));
        }
    }

    #[test]
    fn sixth_failure_adds_one_step() {
        let mut controller = BackoffController::new(BackoffPolicy::default());
        for _ in 1..=5 {
            controller.record_failure();
        }
        assert_eq!(controller.record_failure(), secs(45));
        assert_eq!(controller.consecutive_failures(), 6);
    }

    #[test]
    fn delay_stops_at_cap() {
        let policy = BackoffPolicy::default();
        // 30 + 6 * 15 = 120
        assert_eq!(policy.delay_for(36), secs(120));
        assert_eq!(policy.delay_for(41), secs(120));
        assert_eq!(policy.delay_for(42), secs(120));
        assert_eq!(policy.delay_for(u32::MAX), secs(120));
        assert_eq!(policy.delay_for(30), secs(105));
    }

    #[test]
    fn success_resets_counter() {
        let mut controller = BackoffController::new(BackoffPolicy::default());
        for _ in 0..8 {
            controller.record_failure();
        }
        assert_eq!(controller.record_success(), secs(5));
        assert_eq!(controller.state(), FailureState::default());
        assert_eq!(controller.record_failure(), secs(30));
    }

    #[test]
    fn failure_logging_is_rate_limited() {
        let mut controller = BackoffController::new(BackoffPolicy::default());
        let logged: Vec<u32> = (1..=36)
            .filter(|_| {
                controller.record_failure();
                controller.should_log()
            })
            .collect();
        assert_eq!(logged, vec![1, 2, 12, 24, 36]);
    }

    #[test]
    fn zero_failures_per_step_does_not_divide_by_zero() {
        let policy = BackoffPolicy {
            failures_per_step: 0,
            ..BackoffPolicy::default()
        };
        assert_eq!(policy.delay_for(2), secs(60));
    }
}
