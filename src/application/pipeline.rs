//! Shared pipeline state: rolling tracker, tracked live rounds, predictions.
//!
//! Every piece of mutable state lives in one [`PipelineState`] behind a single
//! `RwLock`. Folding an observation into the tracker, assembling its features,
//! scoring it and writing the cache happen under one write guard, so readers
//! see either none or all of an update.

use std::collections::{BTreeMap, HashMap, VecDeque};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::Serialize;
use tracing::{debug, info, warn};

use super::cache::PredictionCache;
use super::normalizer::Normalizer;
use crate::domain::{
    EntityId, FeatureAssembler, MergeDeduplicator, MergeLimits, PredictionRecord,
    RollingStatsTracker, RoundObservation, Source, WindowSummary,
};
use crate::error::{Error, Result, ScoringError};
use crate::port::{HistoricalRecord, LiveEvent, RawRound, Scorer};

/// Live rounds kept on the board before the oldest is forgotten.
pub const DEFAULT_MAX_TRACKED: usize = 1000;

/// Tunables for a [`Pipeline`].
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    pub capacity: usize,
    /// Empty-window moving average; equal split when `None`.
    pub neutral_average: Option<f64>,
    pub merge: MergeLimits,
    /// Score historical entries afresh on every merged read.
    pub recompute_on_merge: bool,
    pub max_tracked: usize,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            capacity: crate::domain::stats::DEFAULT_CAPACITY,
            neutral_average: None,
            merge: MergeLimits::default(),
            recompute_on_merge: true,
            max_tracked: DEFAULT_MAX_TRACKED,
        }
    }
}

/// A live round currently on the board.
#[derive(Debug, Clone)]
struct TrackedRound {
    observation: RoundObservation,
    /// Already folded into the tracker.
    folded: bool,
}

/// Live rounds in first-seen order.
#[derive(Debug, Default)]
struct Board {
    order: VecDeque<EntityId>,
    rounds: HashMap<EntityId, TrackedRound>,
}

impl Board {
    /// Insert or refresh a round; returns ids evicted to stay within `max`.
    fn upsert(
        &mut self,
        observation: RoundObservation,
        max: usize,
    ) -> (&mut TrackedRound, Vec<EntityId>) {
        let id = observation.entity_id.clone();
        let mut evicted = Vec::new();
        if !self.rounds.contains_key(&id) {
            while self.order.len() >= max.max(1) {
                match self.order.pop_front() {
                    Some(old) => {
                        self.rounds.remove(&old);
                        evicted.push(old);
                    }
                    None => break,
                }
            }
            self.order.push_back(id.clone());
        }
        let entry = self.rounds.entry(id).or_insert_with(|| TrackedRound {
            observation: observation.clone(),
            folded: false,
        });
        entry.observation = observation;
        (entry, evicted)
    }

    fn observations(&self) -> Vec<RoundObservation> {
        self.order
            .iter()
            .filter_map(|id| self.rounds.get(id))
            .map(|round| round.observation.clone())
            .collect()
    }

    fn observed_at(&self, id: &EntityId) -> Option<DateTime<Utc>> {
        self.rounds.get(id).map(|round| round.observation.observed_at)
    }

    fn len(&self) -> usize {
        self.order.len()
    }
}

/// Everything a single write guard protects.
#[derive(Debug)]
struct PipelineState {
    tracker: RollingStatsTracker,
    cache: PredictionCache,
    board: Board,
    /// Latest timestamp accepted per source.
    clocks: HashMap<Source, DateTime<Utc>>,
    last_update: Option<DateTime<Utc>>,
}

impl PipelineState {
    /// Clamp `observed_at` so it never goes backwards within a source.
    fn stamp(&mut self, observation: &mut RoundObservation) {
        let clock = self
            .clocks
            .entry(observation.source)
            .or_insert(observation.observed_at);
        if observation.observed_at < *clock {
            observation.observed_at = *clock;
        } else {
            *clock = observation.observed_at;
        }
    }
}

/// Result of ingesting one batch of live events.
#[derive(Debug, Default)]
pub struct IngestReport {
    /// Events turned into observations (degraded ones included).
    pub processed: usize,
    /// Events dropped for lack of an id.
    pub dropped: usize,
    pub predicted: usize,
    pub scoring_failures: usize,
    /// Rounds seen settled for the first time, with their raw event.
    pub newly_settled: Vec<(RoundObservation, LiveEvent)>,
}

/// One row of the merged live/historical view.
#[derive(Debug, Clone, Serialize)]
pub struct MergedMatch {
    pub observation: RoundObservation,
    pub prediction: Option<PredictionRecord>,
}

/// The write path (normalize, fold, score, cache) and its read snapshots.
pub struct Pipeline {
    state: RwLock<PipelineState>,
    normalizer: Normalizer,
    assembler: FeatureAssembler,
    scorer: Option<Arc<dyn Scorer>>,
    merger: MergeDeduplicator,
    options: PipelineOptions,
}

impl Pipeline {
    #[must_use]
    pub fn new(
        options: PipelineOptions,
        assembler: FeatureAssembler,
        scorer: Option<Arc<dyn Scorer>>,
    ) -> Self {
        let tracker = match options.neutral_average {
            Some(neutral) => RollingStatsTracker::with_neutral_average(options.capacity, neutral),
            None => RollingStatsTracker::new(options.capacity),
        };
        Self {
            state: RwLock::new(PipelineState {
                tracker,
                cache: PredictionCache::new(),
                board: Board::default(),
                clocks: HashMap::new(),
                last_update: None,
            }),
            normalizer: Normalizer::new(assembler.time_policy()),
            merger: MergeDeduplicator::new(options.merge),
            assembler,
            scorer,
            options,
        }
    }

    #[must_use]
    pub fn has_scorer(&self) -> bool {
        self.scorer.is_some()
    }

    #[must_use]
    pub fn assembler(&self) -> &FeatureAssembler {
        &self.assembler
    }

    #[must_use]
    pub fn options(&self) -> &PipelineOptions {
        &self.options
    }

    /// Pre-load the tracker from historical records in chronological order.
    /// Returns how many observations were folded in.
    pub fn seed(&self, records: &[HistoricalRecord], received_at: DateTime<Utc>) -> usize {
        let observations: Vec<RoundObservation> = records
            .iter()
            .filter_map(|record| {
                self.normalizer
                    .normalize_lenient(&RawRound::Historical(record.clone()), received_at)
            })
            .collect();

        let mut state = self.state.write();
        let mut stamped = Vec::with_capacity(observations.len());
        for mut observation in observations {
            state.stamp(&mut observation);
            stamped.push(observation);
        }
        state.tracker.seed(stamped)
    }

    /// Run one batch of live events through the write path, in order.
    pub fn ingest(&self, events: Vec<LiveEvent>, received_at: DateTime<Utc>) -> IngestReport {
        let mut report = IngestReport::default();

        for event in events {
            let raw = RawRound::Live(event.clone());
            let Some(mut observation) = self.normalizer.normalize_lenient(&raw, received_at)
            else {
                report.dropped += 1;
                continue;
            };
            report.processed += 1;

            let mut guard = self.state.write();
            let state = &mut *guard;
            // A re-polled round keeps the time it was first tracked with.
            match state.board.observed_at(&observation.entity_id) {
                Some(first) => observation.observed_at = first,
                None => state.stamp(&mut observation),
            }

            let (round, evicted) = state
                .board
                .upsert(observation.clone(), self.options.max_tracked);
            let fold = observation.is_settled() && !round.folded;
            if fold {
                round.folded = true;
            }
            for id in &evicted {
                state.cache.remove(id);
            }
            if fold {
                state.tracker.push(observation.clone());
                info!(
                    entity = %observation.entity_id,
                    outcome = %observation.outcome,
                    player = observation.primary_score,
                    banker = observation.secondary_score,
                    "Round settled"
                );
                report.newly_settled.push((observation.clone(), event));
            }

            if observation.outcome.is_scorable() {
                match self.score(&observation, &state.tracker, received_at) {
                    Ok(prediction) => {
                        debug!(
                            entity = %prediction.entity_id,
                            label = %prediction.label,
                            confidence = prediction.confidence,
                            "Prediction updated"
                        );
                        state.cache.record(prediction);
                        report.predicted += 1;
                    }
                    Err(Error::ScorerUnavailable) => {}
                    Err(e) => {
                        warn!(entity = %observation.entity_id, error = %e, "Scoring failed");
                        report.scoring_failures += 1;
                    }
                }
            }
            state.last_update = Some(received_at);
        }

        report
    }

    /// Score an observation against the current tracker without caching it.
    ///
    /// # Errors
    /// [`Error::ScorerUnavailable`] without a model, [`Error::Scoring`] when
    /// the observation is unscorable or the model rejects the vector.
    pub fn predict(&self, observation: &RoundObservation) -> Result<PredictionRecord> {
        let state = self.state.read();
        self.score(observation, &state.tracker, Utc::now())
    }

    fn score(
        &self,
        observation: &RoundObservation,
        tracker: &RollingStatsTracker,
        computed_at: DateTime<Utc>,
    ) -> Result<PredictionRecord> {
        let scorer = self.scorer.as_ref().ok_or(Error::ScorerUnavailable)?;
        if !observation.outcome.is_scorable() {
            return Err(ScoringError::Excluded(observation.entity_id.clone()).into());
        }
        let features = self.assembler.assemble(observation, tracker);
        let scored = scorer.score(&features)?;
        Ok(PredictionRecord::new(
            observation.entity_id.clone(),
            scored,
            computed_at,
        ))
    }

    /// Merge tracked live rounds with historical records (most recent
    /// first) and attach predictions. Read-time predictions are not cached.
    pub fn merged(&self, historical: &[HistoricalRecord]) -> Vec<MergedMatch> {
        let now = Utc::now();
        let historical: Vec<RoundObservation> = historical
            .iter()
            .take(self.options.merge.historical_scan)
            .filter_map(|record| {
                self.normalizer
                    .normalize_lenient(&RawRound::Historical(record.clone()), now)
            })
            .collect();

        let state = self.state.read();
        let live = state.board.observations();
        let merged = self.merger.merge(&live, &historical);

        merged
            .into_iter()
            .map(|observation| {
                let cached = state.cache.get(&observation.entity_id).cloned();
                let prediction = match (observation.source, cached) {
                    (Source::Live, Some(cached)) => Some(cached),
                    (Source::Historical, cached) if !self.options.recompute_on_merge => cached,
                    _ => self.score(&observation, &state.tracker, now).ok(),
                };
                MergedMatch {
                    observation,
                    prediction,
                }
            })
            .collect()
    }

    #[must_use]
    pub fn prediction(&self, entity_id: &EntityId) -> Option<PredictionRecord> {
        self.state.read().cache.get(entity_id).cloned()
    }

    #[must_use]
    pub fn predictions(&self) -> BTreeMap<EntityId, PredictionRecord> {
        self.state.read().cache.list_all()
    }

    /// Tracked live rounds, first seen first.
    #[must_use]
    pub fn tracked_entities(&self) -> Vec<RoundObservation> {
        self.state.read().board.observations()
    }

    /// `(tracked rounds, cached predictions)` read under one guard.
    #[must_use]
    pub fn counts(&self) -> (usize, usize) {
        let state = self.state.read();
        (state.board.len(), state.cache.len())
    }

    #[must_use]
    pub fn last_update(&self) -> Option<DateTime<Utc>> {
        self.state.read().last_update
    }

    #[must_use]
    pub fn window_summary(&self) -> WindowSummary {
        self.state.read().tracker.summary()
    }

    /// Copy of the tracker for ad hoc queries.
    #[must_use]
    pub fn tracker(&self) -> RollingStatsTracker {
        self.state.read().tracker.clone()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::domain::{FeatureSchema, OutcomeCategory, TimePolicy};
    use crate::testkit::scorer::FixedScorer;

    fn event(id: i64, player: u32, banker: u32, phase: &str) -> LiveEvent {
        serde_json::from_value(json!({
            "eventId": id,
            "playerScore": player,
            "bankerScore": banker,
            "gamePhase": phase,
            "bettingOptions": [{"optionType": "Player Win", "odd": 1.95}]
        }))
        .unwrap()
    }

    fn pipeline(scorer: Option<Arc<dyn Scorer>>) -> Pipeline {
        Pipeline::new(
            PipelineOptions::default(),
            FeatureAssembler::new(FeatureSchema::default(), TimePolicy::Utc),
            scorer,
        )
    }

    fn fixed() -> Option<Arc<dyn Scorer>> {
        Some(Arc::new(FixedScorer::banker()))
    }

    #[test]
    fn settled_round_is_folded_once() {
        let pipeline = pipeline(fixed());
        let now = Utc::now();

        let report = pipeline.ingest(vec![event(1, 0, 0, "Betting")], now);
        assert_eq!(report.processed, 1);
        assert!(report.newly_settled.is_empty());
        assert_eq!(pipeline.tracker().len(), 0);

        let report = pipeline.ingest(vec![event(1, 8, 2, "Result")], now);
        assert_eq!(report.newly_settled.len(), 1);
        let report = pipeline.ingest(vec![event(1, 8, 2, "Result")], now);
        assert!(report.newly_settled.is_empty());

        let tracker = pipeline.tracker();
        assert_eq!(tracker.len(), 1);
        assert_eq!(tracker.consecutive_run(OutcomeCategory::PlayerWin), 1);
    }

    #[test]
    fn predictions_overwrite_per_entity() {
        let pipeline = pipeline(fixed());
        let now = Utc::now();
        pipeline.ingest(vec![event(1, 0, 0, "Betting"), event(2, 0, 0, "Betting")], now);
        pipeline.ingest(vec![event(1, 4, 5, "Result")], now);

        assert_eq!(pipeline.predictions().len(), 2);
        assert_eq!(pipeline.counts(), (2, 2));
        let prediction = pipeline.prediction(&EntityId::from(1)).unwrap();
        assert_eq!(prediction.label, OutcomeCategory::BankerWin);
        assert!(pipeline.last_update().is_some());
    }

    #[test]
    fn missing_scorer_leaves_cache_empty() {
        let pipeline = pipeline(None);
        let report = pipeline.ingest(vec![event(1, 6, 1, "Result")], Utc::now());
        assert_eq!(report.predicted, 0);
        assert_eq!(report.scoring_failures, 0);
        assert!(pipeline.predictions().is_empty());
        assert_eq!(pipeline.tracked_entities().len(), 1);

        let obs = &pipeline.tracked_entities()[0];
        assert!(matches!(pipeline.predict(obs), Err(Error::ScorerUnavailable)));
    }

    #[test]
    fn scoring_failure_is_contained() {
        let scorer: Arc<dyn Scorer> = Arc::new(FixedScorer::with_width(3));
        let pipeline = pipeline(Some(scorer));
        let report = pipeline.ingest(
            vec![event(1, 0, 0, "Betting"), event(2, 0, 0, "Betting")],
            Utc::now(),
        );
        assert_eq!(report.scoring_failures, 2);
        assert_eq!(report.processed, 2);
        assert!(pipeline.predictions().is_empty());
    }

    #[test]
    fn events_without_id_are_dropped() {
        let pipeline = pipeline(fixed());
        let nameless: LiveEvent =
            serde_json::from_value(json!({"playerScore": 1, "bankerScore": 1})).unwrap();
        let report = pipeline.ingest(vec![nameless, event(5, 0, 0, "Betting")], Utc::now());
        assert_eq!(report.dropped, 1);
        assert_eq!(report.processed, 1);
    }

    #[test]
    fn degraded_rounds_are_tracked_but_not_scored() {
        let pipeline = pipeline(fixed());
        let broken: LiveEvent = serde_json::from_value(json!({"eventId": 42})).unwrap();
        let report = pipeline.ingest(vec![broken], Utc::now());
        assert_eq!(report.processed, 1);
        assert_eq!(report.predicted, 0);
        assert_eq!(pipeline.tracked_entities()[0].outcome, OutcomeCategory::Unknown);
        assert_eq!(pipeline.tracker().len(), 0);
    }

    #[test]
    fn board_is_bounded() {
        let pipeline = Pipeline::new(
            PipelineOptions {
                max_tracked: 2,
                ..PipelineOptions::default()
            },
            FeatureAssembler::default(),
            fixed(),
        );
        pipeline.ingest(
            (1..=3).map(|id| event(id, 0, 0, "Betting")).collect(),
            Utc::now(),
        );
        let ids: Vec<_> = pipeline
            .tracked_entities()
            .into_iter()
            .map(|o| o.entity_id.to_string())
            .collect();
        assert_eq!(ids, vec!["2", "3"]);
        assert!(pipeline.prediction(&EntityId::from(1)).is_none());
        assert_eq!(pipeline.predictions().len(), 2);
    }

    #[test]
    fn timestamps_never_go_backwards_within_a_source() {
        let pipeline = pipeline(fixed());
        let later = Utc::now();
        let earlier = later - chrono::Duration::minutes(5);
        pipeline.ingest(vec![event(1, 0, 0, "Betting")], later);
        pipeline.ingest(vec![event(2, 0, 0, "Betting")], earlier);
        let tracked = pipeline.tracked_entities();
        assert_eq!(tracked[1].observed_at, later);
    }

    #[test]
    fn merged_view_prefers_live_and_attaches_predictions() {
        let pipeline = pipeline(fixed());
        pipeline.ingest(vec![event(1, 0, 0, "Betting"), event(2, 0, 0, "Betting")], Utc::now());

        let history = |id: &str| HistoricalRecord {
            event_id: id.into(),
            option_type: Some("Tie".into()),
            round_state: Some(r#"{"playerScore": 4, "bankerScore": 4}"#.into()),
            ..HistoricalRecord::default()
        };
        let merged = pipeline.merged(&[history("2"), history("3")]);

        let rows: Vec<_> = merged
            .iter()
            .map(|m| (m.observation.entity_id.to_string(), m.observation.source))
            .collect();
        assert_eq!(
            rows,
            vec![
                ("1".to_string(), Source::Live),
                ("2".to_string(), Source::Live),
                ("3".to_string(), Source::Historical),
            ]
        );
        assert!(merged.iter().all(|m| m.prediction.is_some()));
        // Read-time predictions are not cached.
        assert!(pipeline.prediction(&EntityId::from(3)).is_none());
    }

    #[test]
    fn repolled_round_keeps_its_own_start_time() {
        let pipeline = pipeline(fixed());
        let at = |minute: u32| {
            chrono::TimeZone::with_ymd_and_hms(&Utc, 2024, 5, 15, 13, minute, 0).unwrap()
        };
        let started = |id: i64, minute: u32| {
            let mut live = event(id, 0, 0, "Betting");
            live.start_time = Some(json!(at(minute).timestamp()));
            live
        };

        pipeline.ingest(vec![started(1, 42), started(2, 50)], Utc::now());
        pipeline.ingest(vec![started(1, 42), started(2, 50)], Utc::now());

        let tracked = pipeline.tracked_entities();
        assert_eq!(tracked[0].observed_at, at(42));
        assert_eq!(tracked[1].observed_at, at(50));

        let minute = FeatureAssembler::new(FeatureSchema::new(["minute"]), TimePolicy::Utc)
            .assemble(&tracked[0], &pipeline.tracker());
        assert_eq!(minute.as_slice(), &[42.0]);
    }

    #[test]
    fn merged_view_scans_newest_live_rounds() {
        let pipeline = Pipeline::new(
            PipelineOptions {
                merge: MergeLimits {
                    live_scan: 3,
                    ..MergeLimits::default()
                },
                ..PipelineOptions::default()
            },
            FeatureAssembler::default(),
            fixed(),
        );
        pipeline.ingest(
            (1..=5).map(|id| event(id, 0, 0, "Betting")).collect(),
            Utc::now(),
        );
        let archived = HistoricalRecord {
            event_id: "5".into(),
            option_type: Some("Tie".into()),
            round_state: Some(r#"{"playerScore": 4, "bankerScore": 4}"#.into()),
            ..HistoricalRecord::default()
        };

        let rows: Vec<_> = pipeline
            .merged(&[archived])
            .into_iter()
            .map(|m| (m.observation.entity_id.to_string(), m.observation.source))
            .collect();
        assert_eq!(
            rows,
            vec![
                ("3".to_string(), Source::Live),
                ("4".to_string(), Source::Live),
                ("5".to_string(), Source::Live),
            ]
        );
    }

    #[test]
    fn merged_view_without_recompute_uses_cache_only() {
        let pipeline = Pipeline::new(
            PipelineOptions {
                recompute_on_merge: false,
                ..PipelineOptions::default()
            },
            FeatureAssembler::default(),
            fixed(),
        );
        let record = HistoricalRecord {
            event_id: "9".into(),
            option_type: Some("Tie".into()),
            round_state: Some(r#"{"playerScore": 1, "bankerScore": 1}"#.into()),
            ..HistoricalRecord::default()
        };
        let merged = pipeline.merged(&[record]);
        assert_eq!(merged.len(), 1);
        assert!(merged[0].prediction.is_none());
    }

    #[test]
    fn seed_folds_history_in_order() {
        let pipeline = pipeline(None);
        let records: Vec<_> = ["Player Win", "Player Win", "Banker Win", "Player Win"]
            .iter()
            .enumerate()
            .map(|(i, label)| HistoricalRecord {
                event_id: i.to_string(),
                option_type: Some((*label).into()),
                round_state: Some(r#"{"playerScore": 1}"#.into()),
                ..HistoricalRecord::default()
            })
            .collect();
        assert_eq!(pipeline.seed(&records, Utc::now()), 4);
        assert_eq!(
            pipeline.tracker().consecutive_run(OutcomeCategory::PlayerWin),
            1
        );
    }
}
