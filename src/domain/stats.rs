//! Rolling statistics over recently settled rounds.

use std::collections::BTreeMap;

use serde::Serialize;

use super::observation::RoundObservation;
use super::outcome::OutcomeCategory;
use super::window::RollingWindow;

/// Default number of observations retained.
pub const DEFAULT_CAPACITY: usize = 50;

/// Number of outcomes listed in [`WindowSummary::recent`].
const RECENT_OUTCOMES: usize = 10;

/// Bounded window of settled observations with per-category aggregates.
///
/// Only settled outcomes are retained; `Pending` and `Unknown` observations
/// are rejected by [`push`](Self::push).
#[derive(Debug, Clone)]
pub struct RollingStatsTracker {
    window: RollingWindow<RoundObservation>,
    neutral_average: f64,
}

impl RollingStatsTracker {
    /// Tracker whose empty-window average is an equal split across the
    /// primary outcomes.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self::with_neutral_average(capacity, Self::equal_split())
    }

    #[must_use]
    pub fn with_neutral_average(capacity: usize, neutral_average: f64) -> Self {
        Self {
            window: RollingWindow::new(capacity),
            neutral_average,
        }
    }

    /// `1 / |PRIMARY|`.
    #[must_use]
    pub fn equal_split() -> f64 {
        1.0 / OutcomeCategory::PRIMARY.len() as f64
    }

    /// Fold one observation into the window. Returns `false` when the
    /// observation was not settled and therefore ignored.
    pub fn push(&mut self, observation: RoundObservation) -> bool {
        if !observation.is_settled() {
            return false;
        }
        self.window.push(observation);
        true
    }

    /// Pre-load observations in chronological order. Same as pushing each.
    pub fn seed<I>(&mut self, observations: I) -> usize
    where
        I: IntoIterator<Item = RoundObservation>,
    {
        observations
            .into_iter()
            .map(|obs| self.push(obs))
            .filter(|accepted| *accepted)
            .count()
    }

    /// Share of the last `window_size` observations that ended in `category`.
    ///
    /// Uses fewer observations when the window holds fewer. An empty window
    /// or a zero `window_size` yields the neutral average.
    #[must_use]
    pub fn moving_average(&self, category: OutcomeCategory, window_size: usize) -> f64 {
        let considered = window_size.min(self.window.len());
        if considered == 0 {
            return self.neutral_average;
        }
        let hits = self
            .window
            .tail(considered)
            .filter(|obs| obs.outcome == category)
            .count();
        hits as f64 / considered as f64
    }

    /// Length of the run of `category` ending at the newest observation.
    ///
    /// Computed as a fold over the whole window: the counter resets on every
    /// non-matching observation and increments on every match.
    #[must_use]
    pub fn consecutive_run(&self, category: OutcomeCategory) -> usize {
        self.window.iter().fold(0, |run, obs| {
            if obs.outcome == category {
                run + 1
            } else {
                0
            }
        })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.window.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.window.is_empty()
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.window.capacity()
    }

    #[must_use]
    pub fn neutral_average(&self) -> f64 {
        self.neutral_average
    }

    /// Oldest to newest.
    pub fn observations(&self) -> impl Iterator<Item = &RoundObservation> {
        self.window.iter()
    }

    #[must_use]
    pub fn summary(&self) -> WindowSummary {
        let mut distribution: BTreeMap<OutcomeCategory, usize> = OutcomeCategory::SETTLED
            .iter()
            .map(|category| (*category, 0))
            .collect();
        let mut primary_total = 0u64;
        let mut secondary_total = 0u64;
        for obs in self.window.iter() {
            *distribution.entry(obs.outcome).or_default() += 1;
            primary_total += u64::from(obs.primary_score);
            secondary_total += u64::from(obs.secondary_score);
        }

        let total = self.window.len();
        let average = |sum: u64| {
            if total == 0 {
                0.0
            } else {
                sum as f64 / total as f64
            }
        };

        WindowSummary {
            total,
            capacity: self.window.capacity(),
            distribution,
            average_primary_score: average(primary_total),
            average_secondary_score: average(secondary_total),
            recent: self
                .window
                .tail(RECENT_OUTCOMES)
                .map(|obs| obs.outcome)
                .collect(),
        }
    }
}

impl Default for RollingStatsTracker {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

/// Point-in-time description of the rolling window.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WindowSummary {
    pub total: usize,
    pub capacity: usize,
    pub distribution: BTreeMap<OutcomeCategory, usize>,
    pub average_primary_score: f64,
    pub average_secondary_score: f64,
    /// Up to the last ten outcomes, oldest first.
    pub recent: Vec<OutcomeCategory>,
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::domain::id::EntityId;
    use crate::domain::observation::Source;

    use crate::domain::outcome::OutcomeCategory::{BankerWin as B, PlayerWin as A, Tie as T};

    fn obs(id: usize, outcome: OutcomeCategory) -> RoundObservation {
        RoundObservation::new(
            EntityId::new(id.to_string()),
            outcome,
            Source::Historical,
            Utc::now(),
        )
    }

    fn tracker_with(capacity: usize, outcomes: &[OutcomeCategory]) -> RollingStatsTracker {
        let mut tracker = RollingStatsTracker::new(capacity);
        tracker.seed(outcomes.iter().enumerate().map(|(i, o)| obs(i, *o)));
        tracker
    }

    #[test]
    fn run_resets_on_any_mismatch() {
        let tracker = tracker_with(10, &[A, A, B, A]);
        assert_eq!(tracker.consecutive_run(A), 1);
        assert_eq!(tracker.consecutive_run(B), 0);
    }

    #[test]
    fn run_counts_trailing_matches() {
        let tracker = tracker_with(10, &[B, A, A, A]);
        assert_eq!(tracker.consecutive_run(A), 3);
        assert_eq!(tracker_with(10, &[]).consecutive_run(A), 0);
    }

    #[test]
    fn empty_window_average_is_neutral() {
        let tracker = RollingStatsTracker::new(10);
        let avg = tracker.moving_average(A, 5);
        assert!((avg - 1.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn configured_neutral_average_is_used() {
        let tracker = RollingStatsTracker::with_neutral_average(10, 0.25);
        assert_eq!(tracker.moving_average(T, 5), 0.25);
        let tracker = tracker_with(10, &[A, B]);
        assert!((tracker.moving_average(A, 0) - 1.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn average_uses_only_the_tail() {
        let tracker = tracker_with(10, &[A, A, A, B, B, T]);
        assert!((tracker.moving_average(B, 3) - 2.0 / 3.0).abs() < 1e-12);
        assert!((tracker.moving_average(A, 6) - 0.5).abs() < 1e-12);
        // Fewer observations than requested.
        assert!((tracker.moving_average(A, 100) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn window_evicts_oldest_at_capacity() {
        let tracker = tracker_with(3, &[A, B, B, T]);
        assert_eq!(tracker.len(), 3);
        let outcomes: Vec<_> = tracker.observations().map(|o| o.outcome).collect();
        assert_eq!(outcomes, vec![B, B, T]);
    }

    #[test]
    fn unsettled_observations_are_ignored() {
        let mut tracker = RollingStatsTracker::new(5);
        assert!(!tracker.push(obs(1, OutcomeCategory::Unknown)));
        assert!(!tracker.push(obs(2, OutcomeCategory::Pending)));
        assert!(tracker.push(obs(3, A)));
        assert_eq!(tracker.len(), 1);
    }

    #[test]
    fn seeding_twice_is_deterministic() {
        let history = [A, B, B, T, A, A, B, A, A];
        let first = tracker_with(5, &history);
        let second = tracker_with(5, &history);
        for category in OutcomeCategory::SETTLED {
            assert_eq!(first.consecutive_run(category), second.consecutive_run(category));
            for n in [1, 3, 5, 10] {
                assert_eq!(
                    first.moving_average(category, n),
                    second.moving_average(category, n)
                );
            }
        }
    }

    #[test]
    fn summary_reports_distribution_and_recent() {
        let mut tracker = RollingStatsTracker::new(20);
        tracker.push(obs(1, A).with_scores(8, 2));
        tracker.push(obs(2, B).with_scores(1, 7));
        tracker.push(obs(3, A).with_scores(9, 0));

        let summary = tracker.summary();
        assert_eq!(summary.total, 3);
        assert_eq!(summary.distribution[&A], 2);
        assert_eq!(summary.distribution[&T], 0);
        assert_eq!(summary.average_primary_score, 6.0);
        assert_eq!(summary.average_secondary_score, 3.0);
        assert_eq!(summary.recent, vec![A, B, A]);
    }
}
