//! Rolling statistics, feature and merge settings.

use serde::Deserialize;

use crate::application::PipelineOptions;
use crate::domain::{FeatureSchema, MergeLimits, TimePolicy};

/// Rolling window settings.
#[derive(Debug, Clone, Deserialize)]
pub struct StatsConfig {
    /// Observations kept in the rolling window. Also the number of
    /// historical records read when seeding.
    #[serde(default = "default_capacity")]
    pub capacity: usize,
    /// Moving average reported for an empty window. Equal split over the
    /// three main outcomes when unset.
    #[serde(default)]
    pub neutral_average: Option<f64>,
    /// Live rounds kept on the board before the oldest are dropped.
    #[serde(default = "default_max_tracked")]
    pub max_tracked: usize,
}

const fn default_capacity() -> usize {
    crate::domain::stats::DEFAULT_CAPACITY
}

const fn default_max_tracked() -> usize {
    crate::application::pipeline::DEFAULT_MAX_TRACKED
}

impl Default for StatsConfig {
    fn default() -> Self {
        Self {
            capacity: default_capacity(),
            neutral_average: None,
            max_tracked: default_max_tracked(),
        }
    }
}

/// Feature assembly settings.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FeaturesConfig {
    /// Timezone for hour, minute and weekday features.
    #[serde(default)]
    pub time_zone: TimePolicy,
    /// Column order used when no model supplies one.
    #[serde(default)]
    pub schema: Option<Vec<String>>,
}

impl FeaturesConfig {
    /// Configured schema, or the default columns.
    #[must_use]
    pub fn schema(&self) -> FeatureSchema {
        self.schema
            .as_ref()
            .map_or_else(FeatureSchema::default, FeatureSchema::new)
    }
}

/// Live/historical merge settings.
#[derive(Debug, Clone, Deserialize)]
pub struct MergeConfig {
    #[serde(default = "default_max_historical")]
    pub max_historical: usize,
    #[serde(default = "default_historical_scan")]
    pub historical_scan: usize,
    #[serde(default = "default_live_scan")]
    pub live_scan: usize,
    /// Score historical entries on every merged read.
    #[serde(default = "default_recompute_on_merge")]
    pub recompute_on_merge: bool,
}

const fn default_max_historical() -> usize {
    30
}

const fn default_historical_scan() -> usize {
    500
}

const fn default_live_scan() -> usize {
    100
}

const fn default_recompute_on_merge() -> bool {
    true
}

impl Default for MergeConfig {
    fn default() -> Self {
        Self {
            max_historical: default_max_historical(),
            historical_scan: default_historical_scan(),
            live_scan: default_live_scan(),
            recompute_on_merge: default_recompute_on_merge(),
        }
    }
}

impl MergeConfig {
    #[must_use]
    pub fn limits(&self) -> MergeLimits {
        MergeLimits {
            max_historical: self.max_historical,
            historical_scan: self.historical_scan,
            live_scan: self.live_scan,
        }
    }
}

/// Scoring model location.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScorerConfig {
    /// JSON model file. Predictions are unavailable without one.
    #[serde(default)]
    pub model_path: Option<String>,
}

/// Combine the sections into pipeline options.
#[must_use]
pub fn pipeline_options(stats: &StatsConfig, merge: &MergeConfig) -> PipelineOptions {
    PipelineOptions {
        capacity: stats.capacity,
        neutral_average: stats.neutral_average,
        merge: merge.limits(),
        recompute_on_merge: merge.recompute_on_merge,
        max_tracked: stats.max_tracked,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_schema_when_unset() {
        assert_eq!(FeaturesConfig::default().schema(), FeatureSchema::default());
    }

    #[test]
    fn configured_schema_is_used() {
        let config = FeaturesConfig {
            time_zone: TimePolicy::Utc,
            schema: Some(vec!["hour".into(), "minute".into()]),
        };
        assert_eq!(config.schema().names(), &["hour", "minute"]);
    }

    #[test]
    fn options_follow_sections() {
        let options = pipeline_options(
            &StatsConfig {
                capacity: 10,
                neutral_average: Some(0.25),
                max_tracked: 20,
            },
            &MergeConfig {
                recompute_on_merge: false,
                ..MergeConfig::default()
            },
        );
        assert_eq!(options.capacity, 10);
        assert_eq!(options.neutral_average, Some(0.25));
        assert!(!options.recompute_on_merge);
        assert_eq!(options.merge, MergeLimits::default());
    }
}
