//! Wires the poll loop to the pipeline and serves read-only snapshots.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::Serialize;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::fetcher::{FetchHealth, Fetcher};
use super::pipeline::{MergedMatch, Pipeline};
use crate::domain::{BackoffPolicy, EntityId, PredictionRecord, RoundObservation, WindowSummary};
use crate::error::Result;
use crate::port::{HistoricalSource, HistoryArchive, LiveSource};

/// Poll-loop settings.
#[derive(Debug, Clone)]
pub struct OrchestratorSettings {
    pub backoff: BackoffPolicy,
    /// I/O timeout for a single fetch.
    pub timeout: Duration,
    /// Pre-load the tracker from history on start.
    pub seed: bool,
    /// Historical records read when seeding.
    pub seed_limit: usize,
}

impl Default for OrchestratorSettings {
    fn default() -> Self {
        Self {
            backoff: BackoffPolicy::default(),
            timeout: Duration::from_secs(10),
            seed: true,
            seed_limit: crate::domain::stats::DEFAULT_CAPACITY,
        }
    }
}

/// Status summary for external callers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusReport {
    pub running: bool,
    pub tracked_entities: usize,
    pub predictions: usize,
    pub last_update: Option<DateTime<Utc>>,
    pub consecutive_failures: u32,
    pub scorer_loaded: bool,
}

struct LoopHandle {
    shutdown: watch::Sender<bool>,
    task: JoinHandle<()>,
}

/// Owns the poll loop and exposes the read API.
pub struct Orchestrator {
    pipeline: Arc<Pipeline>,
    source: Arc<dyn LiveSource>,
    history: Option<Arc<dyn HistoricalSource>>,
    archive: Option<Arc<dyn HistoryArchive>>,
    settings: OrchestratorSettings,
    running: Arc<AtomicBool>,
    seeded: AtomicBool,
    health: Arc<FetchHealth>,
    handle: Mutex<Option<LoopHandle>>,
}

impl Orchestrator {
    #[must_use]
    pub fn new(
        pipeline: Arc<Pipeline>,
        source: Arc<dyn LiveSource>,
        settings: OrchestratorSettings,
    ) -> Self {
        Self {
            pipeline,
            source,
            history: None,
            archive: None,
            settings,
            running: Arc::new(AtomicBool::new(false)),
            seeded: AtomicBool::new(false),
            health: Arc::new(FetchHealth::default()),
            handle: Mutex::new(None),
        }
    }

    #[must_use]
    pub fn with_history(mut self, history: Arc<dyn HistoricalSource>) -> Self {
        self.history = Some(history);
        self
    }

    #[must_use]
    pub fn with_archive(mut self, archive: Arc<dyn HistoryArchive>) -> Self {
        self.archive = Some(archive);
        self
    }

    #[must_use]
    pub fn pipeline(&self) -> &Arc<Pipeline> {
        &self.pipeline
    }

    /// Seed the tracker from history (once) and spawn the poll loop.
    /// Calling `start` on a running orchestrator does nothing.
    ///
    /// # Errors
    /// Currently infallible; history failures are logged, not returned.
    pub async fn start(&self) -> Result<()> {
        if self.running.swap(true, Ordering::SeqCst) {
            warn!("Poll loop already running");
            return Ok(());
        }

        if self.settings.seed && !self.seeded.swap(true, Ordering::SeqCst) {
            match self.seed_from_history().await {
                Ok(count) => info!(observations = count, "Tracker seeded from history"),
                Err(e) => warn!(error = %e, "Seeding from history failed, starting empty"),
            }
        }

        let mut fetcher = Fetcher::new(
            Arc::clone(&self.source),
            Arc::clone(&self.pipeline),
            self.settings.backoff,
            self.settings.timeout,
        )
        .with_health(Arc::clone(&self.health));
        if let Some(archive) = &self.archive {
            fetcher = fetcher.with_archive(Arc::clone(archive));
        }

        let (shutdown, rx) = watch::channel(false);
        let running = Arc::clone(&self.running);
        let task = tokio::spawn(async move {
            fetcher.run(rx).await;
            running.store(false, Ordering::SeqCst);
        });

        *self.handle.lock() = Some(LoopHandle { shutdown, task });
        info!(
            interval_secs = self.settings.backoff.interval.as_secs(),
            timeout_secs = self.settings.timeout.as_secs(),
            "Orchestrator started"
        );
        Ok(())
    }

    /// Signal the poll loop and wait for it to finish its current step.
    pub async fn stop(&self) {
        let handle = self.handle.lock().take();
        let Some(LoopHandle { shutdown, task }) = handle else {
            return;
        };
        if shutdown.send(true).is_err() {
            debug!("Poll loop already exited before shutdown");
        }
        if let Err(e) = task.await {
            warn!(error = %e, "Poll loop task ended abnormally");
        }
        self.running.store(false, Ordering::SeqCst);
        info!("Orchestrator stopped");
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Load the most recent `seed_limit` records and fold them in
    /// chronological order. Returns the number folded in.
    ///
    /// # Errors
    /// Propagates historical source failures.
    pub async fn seed_from_history(&self) -> Result<usize> {
        let Some(history) = &self.history else {
            return Ok(0);
        };
        let mut records = history.list_recent(self.settings.seed_limit).await?;
        records.reverse();
        Ok(self.pipeline.seed(&records, Utc::now()))
    }

    /// Current prediction for an entity, `None` when there is none.
    #[must_use]
    pub fn prediction(&self, entity_id: &EntityId) -> Option<PredictionRecord> {
        self.pipeline.prediction(entity_id)
    }

    #[must_use]
    pub fn predictions(&self) -> BTreeMap<EntityId, PredictionRecord> {
        self.pipeline.predictions()
    }

    #[must_use]
    pub fn tracked_entities(&self) -> Vec<RoundObservation> {
        self.pipeline.tracked_entities()
    }

    /// Live rounds followed by recent history, deduplicated, each with a
    /// prediction when one can be produced.
    pub async fn merged_matches(&self) -> Vec<MergedMatch> {
        let historical = match &self.history {
            Some(history) => {
                let scan = self.pipeline.options().merge.historical_scan;
                match history.list_recent(scan).await {
                    Ok(records) => records,
                    Err(e) => {
                        warn!(error = %e, "Historical source unavailable, merging live only");
                        Vec::new()
                    }
                }
            }
            None => Vec::new(),
        };
        self.pipeline.merged(&historical)
    }

    #[must_use]
    pub fn status(&self) -> StatusReport {
        let (tracked_entities, predictions) = self.pipeline.counts();
        StatusReport {
            running: self.is_running(),
            tracked_entities,
            predictions,
            last_update: self.pipeline.last_update(),
            consecutive_failures: self.health.consecutive_failures(),
            scorer_loaded: self.pipeline.has_scorer(),
        }
    }

    #[must_use]
    pub fn window_summary(&self) -> WindowSummary {
        self.pipeline.window_summary()
    }
}
