//! Handler for the `replay` command.

use chrono::Utc;
use tabled::{Table, Tabled};

use crate::application::MergedMatch;
use crate::cli::{output, Cli, ReplayArgs};
use crate::error::Result;
use crate::infrastructure::bootstrap::{build_pipeline, open_store};
use crate::infrastructure::config::Config;
use crate::port::HistoricalSource;

#[derive(Tabled)]
struct MatchRow {
    #[tabled(rename = "Round")]
    round: String,
    #[tabled(rename = "Source")]
    source: String,
    #[tabled(rename = "Outcome")]
    outcome: String,
    #[tabled(rename = "Score")]
    score: String,
    #[tabled(rename = "Prediction")]
    prediction: String,
    #[tabled(rename = "Confidence")]
    confidence: String,
}

impl From<&MergedMatch> for MatchRow {
    fn from(row: &MergedMatch) -> Self {
        let observation = &row.observation;
        let (prediction, confidence) = match &row.prediction {
            Some(p) => (p.label.to_string(), format!("{:.1}%", p.confidence * 100.0)),
            None => ("-".into(), "-".into()),
        };
        Self {
            round: observation.entity_id.to_string(),
            source: observation.source.to_string(),
            outcome: observation.outcome.to_string(),
            score: format!(
                "{}-{}",
                observation.primary_score, observation.secondary_score
            ),
            prediction,
            confidence,
        }
    }
}

/// Seed the window from the archive and print the merged view.
pub async fn execute(cli: &Cli, args: &ReplayArgs) -> Result<()> {
    let config = Config::load(&cli.config)?;
    config.init_logging(cli.log_level.as_deref(), cli.json_logs);
    let store = open_store(&config.history)?;
    let pipeline = build_pipeline(&config);

    let mut seed = store.list_recent(config.stats.capacity).await?;
    seed.reverse();
    let folded = pipeline.seed(&seed, Utc::now());

    let summary = pipeline.window_summary();
    output::section("Rolling window");
    output::field("Rounds", format!("{} / {}", summary.total, summary.capacity));
    output::field("Folded", folded);
    for (category, count) in &summary.distribution {
        output::field(category.label(), count);
    }
    output::field(
        "Avg score",
        format!(
            "{:.2} - {:.2}",
            summary.average_primary_score, summary.average_secondary_score
        ),
    );
    let recent: Vec<&str> = summary.recent.iter().map(|c| c.label()).collect();
    output::field("Recent", output::muted(recent.join(", ")));
    if let Ok(payload) = serde_json::to_value(&summary) {
        output::record("summary", payload);
    }

    let historical = store
        .list_recent(pipeline.options().merge.historical_scan)
        .await?;
    let merged = pipeline.merged(&historical);
    output::section(&format!("Merged rounds ({})", merged.len()));
    if merged.is_empty() {
        output::warning("Archive is empty");
        return Ok(());
    }
    if !pipeline.has_scorer() {
        output::warning("No model loaded; predictions unavailable");
    }

    let rows: Vec<MatchRow> = merged.iter().take(args.limit).map(MatchRow::from).collect();
    output::lines(&Table::new(rows).to_string());
    for row in merged.iter().take(args.limit) {
        if let Ok(payload) = serde_json::to_value(row) {
            output::record("match", payload);
        }
    }
    Ok(())
}
