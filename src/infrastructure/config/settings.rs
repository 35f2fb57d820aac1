//! Application configuration loading and validation.
//!
//! Provides the main [`Config`] struct that aggregates all application settings.
//! Every section is optional; an empty file yields the defaults.
//!
//! # Example
//!
//! ```no_run
//! use roundcast::infrastructure::config::Config;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::load("config.toml")?;
//!     config.init_logging(None, false);
//!     Ok(())
//! }
//! ```

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;
use url::Url;

use super::logging::LoggingConfig;
use super::tracking::{FeaturesConfig, MergeConfig, ScorerConfig, StatsConfig};
use crate::adapter::feed::FeedConfig;
use crate::adapter::store::HistoryConfig;
use crate::error::{ConfigError, Result};

/// Main application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Live feed endpoint, poll interval and backoff.
    #[serde(default)]
    pub feed: FeedConfig,

    /// Rolling window size and empty-window defaults.
    #[serde(default)]
    pub stats: StatsConfig,

    #[serde(default)]
    pub features: FeaturesConfig,

    /// Live/historical merge bounds.
    #[serde(default)]
    pub merge: MergeConfig,

    #[serde(default)]
    pub scorer: ScorerConfig,

    /// Round archive used for seeding, merging and live recording.
    #[serde(default)]
    pub history: HistoryConfig,

    #[serde(default)]
    pub logging: LoggingConfig,

    /// Seconds between status lines while running.
    #[serde(default = "default_status_interval_secs")]
    pub status_interval_secs: u64,
}

const fn default_status_interval_secs() -> u64 {
    60
}

impl Default for Config {
    fn default() -> Self {
        Self {
            feed: FeedConfig::default(),
            stats: StatsConfig::default(),
            features: FeaturesConfig::default(),
            merge: MergeConfig::default(),
            scorer: ScorerConfig::default(),
            history: HistoryConfig::default(),
            logging: LoggingConfig::default(),
            status_interval_secs: default_status_interval_secs(),
        }
    }
}

impl Config {
    /// Parse configuration from TOML content.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML content is malformed or validation fails.
    pub fn parse_toml(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).map_err(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file, reading `.env` first.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The file cannot be read
    /// - The TOML content is malformed
    /// - Validation fails
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let _ = dotenvy::dotenv();
        let content = std::fs::read_to_string(path).map_err(ConfigError::ReadFile)?;
        Self::parse_toml(&content)
    }

    /// Initialize tracing from the `[logging]` section, with command-line
    /// `level` and `json` overrides applied on top.
    pub fn init_logging(&self, level: Option<&str>, json: bool) {
        self.logging.clone().with_overrides(level, json).init();
    }

    #[must_use]
    pub fn status_interval(&self) -> Duration {
        Duration::from_secs(self.status_interval_secs)
    }

    /// Validate configuration values.
    fn validate(&self) -> Result<()> {
        if self.feed.url.is_empty() {
            return Err(ConfigError::MissingField { field: "feed.url" }.into());
        }
        Url::parse(&self.feed.url).map_err(|e| ConfigError::InvalidValue {
            field: "feed.url",
            reason: e.to_string(),
        })?;
        if self.feed.count == 0 {
            return Err(ConfigError::InvalidValue {
                field: "feed.count",
                reason: "must be greater than 0".to_string(),
            }
            .into());
        }
        if self.feed.poll_interval_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "feed.poll_interval_secs",
                reason: "must be greater than 0".to_string(),
            }
            .into());
        }
        if self.feed.timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "feed.timeout_secs",
                reason: "must be greater than 0".to_string(),
            }
            .into());
        }

        let backoff = &self.feed.backoff;
        if backoff.failures_per_step == 0 {
            return Err(ConfigError::InvalidValue {
                field: "feed.backoff.failures_per_step",
                reason: "must be greater than 0".to_string(),
            }
            .into());
        }
        if backoff.cap_secs < backoff.base_secs {
            return Err(ConfigError::InvalidValue {
                field: "feed.backoff.cap_secs",
                reason: "must be >= base_secs".to_string(),
            }
            .into());
        }

        if self.stats.capacity == 0 {
            return Err(ConfigError::InvalidValue {
                field: "stats.capacity",
                reason: "must be greater than 0".to_string(),
            }
            .into());
        }
        if let Some(neutral) = self.stats.neutral_average {
            if !(0.0..=1.0).contains(&neutral) {
                return Err(ConfigError::InvalidValue {
                    field: "stats.neutral_average",
                    reason: "must be between 0 and 1".to_string(),
                }
                .into());
            }
        }
        if self.stats.max_tracked == 0 {
            return Err(ConfigError::InvalidValue {
                field: "stats.max_tracked",
                reason: "must be greater than 0".to_string(),
            }
            .into());
        }

        if let Some(schema) = &self.features.schema {
            if schema.is_empty() {
                return Err(ConfigError::InvalidValue {
                    field: "features.schema",
                    reason: "must name at least one feature".to_string(),
                }
                .into());
            }
        }

        if self.merge.historical_scan < self.merge.max_historical {
            return Err(ConfigError::InvalidValue {
                field: "merge.historical_scan",
                reason: "must be >= max_historical".to_string(),
            }
            .into());
        }

        if self.history.database.is_empty() {
            return Err(ConfigError::MissingField {
                field: "history.database",
            }
            .into());
        }

        if self.status_interval_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "status_interval_secs",
                reason: "must be greater than 0".to_string(),
            }
            .into());
        }

        Ok(())
    }
}
