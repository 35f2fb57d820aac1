//! Canonical test configurations.
//!
//! Single source of truth for config structs used across tests.

use std::time::Duration;

use crate::domain::BackoffPolicy;

/// Backoff with millisecond sleeps so poll loops spin quickly in tests.
pub fn instant_backoff() -> BackoffPolicy {
    BackoffPolicy {
        interval: Duration::from_millis(1),
        base: Duration::from_millis(1),
        step: Duration::from_millis(1),
        failures_per_step: 6,
        cap: Duration::from_millis(5),
    }
}
