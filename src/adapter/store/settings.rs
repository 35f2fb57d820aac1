//! Round archive configuration.

use serde::Deserialize;

/// Where past rounds live and how they are used.
#[derive(Debug, Clone, Deserialize)]
pub struct HistoryConfig {
    /// SQLite database path. Created on first use.
    #[serde(default = "default_database")]
    pub database: String,
    /// Seed the rolling window from the archive on start.
    #[serde(default = "default_true")]
    pub seed: bool,
    /// Archive live rounds the first time they are seen settled.
    #[serde(default = "default_true")]
    pub record_live: bool,
}

fn default_database() -> String {
    "roundcast.db".into()
}

const fn default_true() -> bool {
    true
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            database: default_database(),
            seed: true,
            record_live: true,
        }
    }
}
