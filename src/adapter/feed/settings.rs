//! Live feed configuration.

use std::time::Duration;

use serde::Deserialize;

use crate::domain::BackoffPolicy;

/// Connection and polling settings for the live feed.
#[derive(Debug, Clone, Deserialize)]
pub struct FeedConfig {
    /// Live feed endpoint.
    #[serde(default = "default_url")]
    pub url: String,
    /// Entries with any other `SportId` are ignored.
    #[serde(default = "default_sport_id")]
    pub sport_id: u64,
    /// Number of events requested per poll.
    #[serde(default = "default_count")]
    pub count: u32,
    #[serde(default = "default_language")]
    pub language: String,
    /// Seconds between successful polls.
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,
    /// I/O timeout for one fetch, in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default)]
    pub backoff: BackoffConfig,
}

fn default_url() -> String {
    "https://api.1xbet.com/LiveFeed/Get1x2_Virtual".into()
}

const fn default_sport_id() -> u64 {
    146
}

const fn default_count() -> u32 {
    50
}

fn default_language() -> String {
    "fr".into()
}

const fn default_poll_interval_secs() -> u64 {
    5
}

const fn default_timeout_secs() -> u64 {
    10
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            url: default_url(),
            sport_id: default_sport_id(),
            count: default_count(),
            language: default_language(),
            poll_interval_secs: default_poll_interval_secs(),
            timeout_secs: default_timeout_secs(),
            backoff: BackoffConfig::default(),
        }
    }
}

impl FeedConfig {
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Sleep schedule combining the poll interval and the backoff section.
    #[must_use]
    pub fn backoff_policy(&self) -> BackoffPolicy {
        BackoffPolicy {
            interval: Duration::from_secs(self.poll_interval_secs),
            base: Duration::from_secs(self.backoff.base_secs),
            step: Duration::from_secs(self.backoff.step_secs),
            failures_per_step: self.backoff.failures_per_step,
            cap: Duration::from_secs(self.backoff.cap_secs),
        }
    }
}

/// `sleep = min(base + (failures / failures_per_step) * step, cap)`.
#[derive(Debug, Clone, Deserialize)]
pub struct BackoffConfig {
    #[serde(default = "default_base_secs")]
    pub base_secs: u64,
    #[serde(default = "default_step_secs")]
    pub step_secs: u64,
    #[serde(default = "default_failures_per_step")]
    pub failures_per_step: u32,
    #[serde(default = "default_cap_secs")]
    pub cap_secs: u64,
}

const fn default_base_secs() -> u64 {
    30
}

const fn default_step_secs() -> u64 {
    15
}

const fn default_failures_per_step() -> u32 {
    6
}

const fn default_cap_secs() -> u64 {
    120
}

impl Default for BackoffConfig {
    fn default() -> Self {
        Self {
            base_secs: default_base_secs(),
            step_secs: default_step_secs(),
            failures_per_step: default_failures_per_step(),
            cap_secs: default_cap_secs(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_policy_defaults() {
        let policy = FeedConfig::default().backoff_policy();
        assert_eq!(policy, BackoffPolicy::default());
    }
}
