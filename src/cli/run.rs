//! Handler for the `run` command.

use tokio::signal;
use tracing::{error, info};

use crate::application::Orchestrator;
use crate::cli::{output, Cli};
use crate::error::Result;
use crate::infrastructure::bootstrap::build_orchestrator;
use crate::infrastructure::config::Config;

/// Start the poll loop and block until Ctrl-C.
pub async fn execute(cli: &Cli) -> Result<()> {
    let config = Config::load(&cli.config)?;
    config.init_logging(cli.log_level.as_deref(), cli.json_logs);

    print_startup(&config);

    let orchestrator = build_orchestrator(&config)?;
    orchestrator.start().await?;
    info!("roundcast running");

    let mut ticker = tokio::time::interval(config.status_interval());
    ticker.tick().await;
    let shutdown = signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            result = &mut shutdown => {
                if let Err(e) = result {
                    error!(error = %e, "Failed to listen for shutdown signal");
                }
                info!("Shutdown signal received");
                break;
            }
            _ = ticker.tick() => log_status(&orchestrator),
        }
    }

    orchestrator.stop().await;
    info!("roundcast stopped");
    Ok(())
}

fn print_startup(config: &Config) {
    output::header(env!("CARGO_PKG_VERSION"));
    output::field("Feed", &config.feed.url);
    output::field("Interval", format!("{}s", config.feed.poll_interval_secs));
    output::field(
        "Model",
        config.scorer.model_path.as_deref().unwrap_or("none"),
    );
    output::field("Archive", &config.history.database);
    output::field("Window", config.stats.capacity);
}

fn log_status(orchestrator: &Orchestrator) {
    let status = orchestrator.status();
    let summary = orchestrator.window_summary();
    info!(
        running = status.running,
        tracked = status.tracked_entities,
        predictions = status.predictions,
        failures = status.consecutive_failures,
        window = summary.total,
        last_update = ?status.last_update,
        "Status"
    );
    if let Ok(payload) = serde_json::to_value(&status) {
        output::record("status", payload);
    }
}
