//! Composition root: builds the scorer, pipeline, store and orchestrator
//! from configuration.

use std::sync::Arc;

use tracing::{info, warn};

use super::config::tracking::pipeline_options;
use super::config::{Config, ScorerConfig};
use crate::adapter::feed::HttpLiveSource;
use crate::adapter::scorer::LinearScorer;
use crate::adapter::store::{create_pool, run_migrations, HistoryConfig, SqliteRoundStore};
use crate::application::{Orchestrator, OrchestratorSettings, Pipeline};
use crate::domain::{FeatureAssembler, FeatureSchema};
use crate::error::Result;
use crate::port::{LiveSource, Scorer};

/// Load the configured model. A missing or unreadable model is logged and
/// leaves predictions unavailable.
#[must_use]
pub fn build_scorer(config: &ScorerConfig) -> Option<Arc<dyn Scorer>> {
    let Some(path) = &config.model_path else {
        info!("No model configured, predictions unavailable");
        return None;
    };
    match LinearScorer::load(path) {
        Ok(scorer) => {
            info!(
                path = %path,
                features = scorer.feature_names().len(),
                labels = scorer.labels().len(),
                "Model loaded"
            );
            Some(Arc::new(scorer))
        }
        Err(e) => {
            warn!(path = %path, error = %e, "Failed to load model, predictions unavailable");
            None
        }
    }
}

/// Feature assembler whose column order is the model's, else the
/// configured one, else the default.
#[must_use]
pub fn build_assembler(config: &Config, scorer: Option<&Arc<dyn Scorer>>) -> FeatureAssembler {
    let schema = match scorer {
        Some(scorer) => FeatureSchema::new(scorer.feature_names().iter().cloned()),
        None => config.features.schema(),
    };
    let unresolved: Vec<&str> = schema.unresolved().collect();
    if !unresolved.is_empty() {
        warn!(features = ?unresolved, "Unrecognised feature names will be filled with 0");
    }
    FeatureAssembler::new(schema, config.features.time_zone)
}

#[must_use]
pub fn build_pipeline(config: &Config) -> Arc<Pipeline> {
    let scorer = build_scorer(&config.scorer);
    let assembler = build_assembler(config, scorer.as_ref());
    Arc::new(Pipeline::new(
        pipeline_options(&config.stats, &config.merge),
        assembler,
        scorer,
    ))
}

/// Open the round archive, creating and migrating it if needed.
///
/// # Errors
/// Returns an error if the database cannot be opened or migrated.
pub fn open_store(config: &HistoryConfig) -> Result<Arc<SqliteRoundStore>> {
    let pool = create_pool(&config.database)?;
    run_migrations(&pool)?;
    info!(database = %config.database, "Round archive ready");
    Ok(Arc::new(SqliteRoundStore::new(pool)))
}

#[must_use]
pub fn orchestrator_settings(config: &Config) -> OrchestratorSettings {
    OrchestratorSettings {
        backoff: config.feed.backoff_policy(),
        timeout: config.feed.timeout(),
        seed: config.history.seed,
        seed_limit: config.stats.capacity,
    }
}

/// Wire everything for `run`. An archive that cannot be opened is logged
/// and the orchestrator runs on the live feed alone.
///
/// # Errors
/// Returns an error if the live source cannot be built.
pub fn build_orchestrator(config: &Config) -> Result<Orchestrator> {
    let source: Arc<dyn LiveSource> = Arc::new(HttpLiveSource::from_config(&config.feed)?);
    let pipeline = build_pipeline(config);
    let mut orchestrator = Orchestrator::new(pipeline, source, orchestrator_settings(config));

    match open_store(&config.history) {
        Ok(store) => {
            orchestrator = orchestrator.with_history(Arc::clone(&store) as _);
            if config.history.record_live {
                orchestrator = orchestrator.with_archive(store);
            }
        }
        Err(e) => warn!(
            database = %config.history.database,
            error = %e,
            "Round archive unavailable, running without history"
        ),
    }

    Ok(orchestrator)
}
