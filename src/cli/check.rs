//! Configuration and feed diagnostics.

use std::path::Path;

use crate::adapter::feed::HttpLiveSource;
use crate::cli::{output, Cli};
use crate::domain::TimePolicy;
use crate::error::Result;
use crate::infrastructure::config::Config;
use crate::port::LiveSource;

/// Validate the configuration file and print a summary.
pub fn execute_config(cli: &Cli) -> Result<()> {
    output::section(&format!("Checking {}", cli.config.display()));
    let config = Config::load(&cli.config)?;
    config.init_logging(cli.log_level.as_deref(), cli.json_logs);
    output::success("Configuration file is valid");

    output::section("Summary");
    output::field("Feed", &config.feed.url);
    output::field("Sport", config.feed.sport_id);
    output::field("Interval", format!("{}s", config.feed.poll_interval_secs));
    output::field("Timeout", format!("{}s", config.feed.timeout_secs));
    output::field(
        "Backoff",
        format!(
            "{}s +{}s every {} failures, cap {}s",
            config.feed.backoff.base_secs,
            config.feed.backoff.step_secs,
            config.feed.backoff.failures_per_step,
            config.feed.backoff.cap_secs
        ),
    );
    output::field("Window", config.stats.capacity);
    output::field(
        "Time zone",
        match config.features.time_zone {
            TimePolicy::Local => "local",
            TimePolicy::Utc => "utc",
        },
    );
    output::field("Features", config.features.schema().len());
    output::field("Archive", &config.history.database);

    match &config.scorer.model_path {
        Some(model) if Path::new(model).exists() => {
            output::success(&format!("Model file found: {model}"));
        }
        Some(model) => output::warning(&format!(
            "Model file not found: {model}; predictions will be unavailable"
        )),
        None => output::warning("No model configured; predictions will be unavailable"),
    }
    Ok(())
}

/// Perform one fetch against the live feed.
pub async fn execute_feed(cli: &Cli) -> Result<()> {
    let config = Config::load(&cli.config)?;
    config.init_logging(cli.log_level.as_deref(), cli.json_logs);
    let source = HttpLiveSource::from_config(&config.feed)?;
    output::section(&format!("Fetching {}", output::highlight(source.url())));

    let events = source.fetch().await?;
    let settled = events
        .iter()
        .filter(|event| event.game_phase.as_deref() == Some("Result"))
        .count();
    output::success("Live feed reachable");
    output::field("Rounds", events.len());
    output::field("Settled", settled);
    Ok(())
}
