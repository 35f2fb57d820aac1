//! Infrastructure configuration modules.

pub mod logging;
pub mod settings;
pub mod tracking;

pub use logging::LoggingConfig;
pub use settings::Config;
pub use tracking::{FeaturesConfig, MergeConfig, ScorerConfig, StatsConfig};
