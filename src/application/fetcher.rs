//! Live source poll loop.
//!
//! `Idle -> Polling -> (Success | Failure) -> Idle`, forever, until the
//! shutdown signal flips. Cancellation is only observed between polls: a
//! fetch and the ingestion of its events always run to completion.

use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use super::pipeline::Pipeline;
use crate::domain::{BackoffController, BackoffPolicy};
use crate::error::{FailureKind, FetchError};
use crate::port::{HistoricalRecord, HistoryArchive, LiveSource};

/// Fetch counters shared with status readers.
#[derive(Debug, Default)]
pub struct FetchHealth {
    consecutive_failures: AtomicU32,
    polls: AtomicU64,
}

impl FetchHealth {
    #[must_use]
    pub fn consecutive_failures(&self) -> u32 {
        self.consecutive_failures.load(Ordering::Relaxed)
    }

    /// Completed fetch attempts, successful or not.
    #[must_use]
    pub fn polls(&self) -> u64 {
        self.polls.load(Ordering::Relaxed)
    }

    fn publish(&self, failures: u32) {
        self.consecutive_failures.store(failures, Ordering::Relaxed);
        self.polls.fetch_add(1, Ordering::Relaxed);
    }
}

/// Outcome of a single poll.
#[derive(Debug, Clone, PartialEq)]
pub enum PollOutcome {
    Success { events: usize, settled: usize },
    Failure(FetchError),
}

/// Polls a [`LiveSource`] and feeds the [`Pipeline`].
pub struct Fetcher {
    source: Arc<dyn LiveSource>,
    pipeline: Arc<Pipeline>,
    archive: Option<Arc<dyn HistoryArchive>>,
    backoff: BackoffController,
    timeout: Duration,
    health: Arc<FetchHealth>,
}

impl Fetcher {
    #[must_use]
    pub fn new(
        source: Arc<dyn LiveSource>,
        pipeline: Arc<Pipeline>,
        policy: BackoffPolicy,
        timeout: Duration,
    ) -> Self {
        Self {
            source,
            pipeline,
            archive: None,
            backoff: BackoffController::new(policy),
            timeout,
            health: Arc::new(FetchHealth::default()),
        }
    }

    /// Archive rounds the first time they are seen settled.
    #[must_use]
    pub fn with_archive(mut self, archive: Arc<dyn HistoryArchive>) -> Self {
        self.archive = Some(archive);
        self
    }

    #[must_use]
    pub fn with_health(mut self, health: Arc<FetchHealth>) -> Self {
        self.health = health;
        self
    }

    #[must_use]
    pub fn health(&self) -> Arc<FetchHealth> {
        Arc::clone(&self.health)
    }

    #[must_use]
    pub fn consecutive_failures(&self) -> u32 {
        self.backoff.consecutive_failures()
    }

    /// One fetch attempt. Returns what happened and how long to sleep.
    pub async fn poll_once(&mut self) -> (PollOutcome, Duration) {
        let fetched = match tokio::time::timeout(self.timeout, self.source.fetch()).await {
            Ok(result) => result,
            Err(_) => Err(FetchError::Timeout {
                after: self.timeout,
            }),
        };

        match fetched {
            Ok(events) => {
                let count = events.len();
                let report = self.pipeline.ingest(events, Utc::now());
                let settled = report.newly_settled.len();
                debug!(
                    source = self.source.name(),
                    events = count,
                    predicted = report.predicted,
                    dropped = report.dropped,
                    "Poll succeeded"
                );
                if let Some(archive) = &self.archive {
                    for (observation, raw) in &report.newly_settled {
                        let record = HistoricalRecord::archived(observation, raw, Utc::now());
                        match archive.append(&record).await {
                            Ok(true) => debug!(entity = %observation.entity_id, "Round archived"),
                            Ok(false) => {}
                            Err(e) => warn!(
                                entity = %observation.entity_id,
                                error = %e,
                                "Failed to archive round"
                            ),
                        }
                    }
                }

                let previous = self.backoff.consecutive_failures();
                let delay = self.backoff.record_success();
                if previous > 0 {
                    info!(
                        source = self.source.name(),
                        after_failures = previous,
                        "Live source recovered"
                    );
                }
                self.health.publish(0);
                (
                    PollOutcome::Success {
                        events: count,
                        settled,
                    },
                    delay,
                )
            }
            Err(err) => {
                let delay = self.backoff.record_failure();
                let failures = self.backoff.consecutive_failures();
                self.health.publish(failures);
                if self.backoff.should_log() {
                    self.log_failure(&err, failures, delay);
                }
                (PollOutcome::Failure(err), delay)
            }
        }
    }

    fn log_failure(&self, err: &FetchError, failures: u32, delay: Duration) {
        let source = self.source.name();
        let retry_in_secs = delay.as_secs();
        match (err.kind(), err) {
            (FailureKind::Response, FetchError::Status { status }) => warn!(
                source,
                status = *status,
                failures,
                retry_in_secs,
                "Live source returned non-success status"
            ),
            (FailureKind::Response, _) => warn!(
                source,
                error = %err,
                failures,
                retry_in_secs,
                "Live source returned an unusable response"
            ),
            (FailureKind::Transport, _) => warn!(
                source,
                error = %err,
                failures,
                retry_in_secs,
                "Live source unreachable"
            ),
        }
    }

    /// Poll until `shutdown` reads `true` or its sender is dropped.
    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) {
        info!(source = self.source.name(), "Poll loop started");
        loop {
            if *shutdown.borrow() {
                break;
            }
            let (_, delay) = self.poll_once().await;

            tokio::select! {
                result = shutdown.changed() => {
                    match result {
                        Ok(()) => {
                            if *shutdown.borrow() {
                                break;
                            }
                        }
                        Err(_) => break,
                    }
                }
                () = tokio::time::sleep(delay) => {}
            }
        }
        info!(source = self.source.name(), "Poll loop stopped");
    }
}
