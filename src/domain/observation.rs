//! Canonical round observation, shared by every downstream component.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::id::EntityId;
use super::outcome::OutcomeCategory;

/// Which feed an observation came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    Live,
    Historical,
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Live => f.write_str("live"),
            Self::Historical => f.write_str("historical"),
        }
    }
}

/// Stage of a round as reported by the feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GamePhase {
    #[default]
    Betting,
    Result,
}

impl GamePhase {
    /// Parse a feed phase label; anything but `Result` counts as betting.
    #[must_use]
    pub fn from_label(raw: &str) -> Self {
        if raw.trim().eq_ignore_ascii_case("result") {
            Self::Result
        } else {
            Self::Betting
        }
    }
}

/// Payout multipliers per outcome category.
///
/// Only positive, finite multipliers are stored; lookups for a missing
/// category fall back to the neutral multiplier `1.0`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OddsTable(BTreeMap<OutcomeCategory, f64>);

impl OddsTable {
    /// Multiplier reported when a category has no quote.
    pub const NEUTRAL: f64 = 1.0;

    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a quote. Returns `false` (and stores nothing) for non-positive
    /// or non-finite multipliers and for unsettled categories.
    pub fn insert(&mut self, category: OutcomeCategory, odd: f64) -> bool {
        if !category.is_settled() || !odd.is_finite() || odd <= 0.0 {
            return false;
        }
        self.0.insert(category, odd);
        true
    }

    /// Quote for a category, or [`OddsTable::NEUTRAL`] when absent.
    #[must_use]
    pub fn get(&self, category: OutcomeCategory) -> f64 {
        self.0.get(&category).copied().unwrap_or(Self::NEUTRAL)
    }

    /// Lowest quoted multiplier, if any quote exists.
    #[must_use]
    pub fn lowest(&self) -> Option<f64> {
        self.0.values().copied().reduce(f64::min)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (OutcomeCategory, f64)> + '_ {
        self.0.iter().map(|(category, odd)| (*category, *odd))
    }
}

impl FromIterator<(OutcomeCategory, f64)> for OddsTable {
    fn from_iter<I: IntoIterator<Item = (OutcomeCategory, f64)>>(iter: I) -> Self {
        let mut table = Self::new();
        for (category, odd) in iter {
            table.insert(category, odd);
        }
        table
    }
}

/// One round, normalized from either feed shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoundObservation {
    pub entity_id: EntityId,
    pub outcome: OutcomeCategory,
    /// Player hand score.
    pub primary_score: u32,
    /// Banker hand score.
    pub secondary_score: u32,
    pub odds: OddsTable,
    /// Multiplier the round was recorded against; `1.0` when unknown.
    pub reference_odd: f64,
    pub round_number: u32,
    pub is_live: bool,
    pub phase: GamePhase,
    pub name: Option<String>,
    pub observed_at: DateTime<Utc>,
    pub source: Source,
}

impl RoundObservation {
    /// An observation with every optional field at its default.
    #[must_use]
    pub fn new(
        entity_id: EntityId,
        outcome: OutcomeCategory,
        source: Source,
        observed_at: DateTime<Utc>,
    ) -> Self {
        Self {
            entity_id,
            outcome,
            primary_score: 0,
            secondary_score: 0,
            odds: OddsTable::new(),
            reference_odd: OddsTable::NEUTRAL,
            round_number: 0,
            is_live: false,
            phase: GamePhase::Betting,
            name: None,
            observed_at,
            source,
        }
    }

    /// The all-defaults stand-in used when a payload could not be read:
    /// zero scores, neutral odds, `Unknown` outcome.
    #[must_use]
    pub fn degraded(entity_id: EntityId, source: Source, observed_at: DateTime<Utc>) -> Self {
        Self::new(entity_id, OutcomeCategory::Unknown, source, observed_at)
    }

    #[must_use]
    pub fn with_scores(mut self, primary: u32, secondary: u32) -> Self {
        self.primary_score = primary;
        self.secondary_score = secondary;
        self
    }

    #[must_use]
    pub fn with_odds(mut self, odds: OddsTable) -> Self {
        self.odds = odds;
        self
    }

    /// True when the round has a definite result.
    #[must_use]
    pub fn is_settled(&self) -> bool {
        self.outcome.is_settled()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_odds_default_to_neutral() {
        let odds: OddsTable = [(OutcomeCategory::PlayerWin, 1.95)].into_iter().collect();
        assert_eq!(odds.get(OutcomeCategory::PlayerWin), 1.95);
        assert_eq!(odds.get(OutcomeCategory::Tie), 1.0);
    }

    #[test]
    fn invalid_quotes_are_dropped() {
        let mut odds = OddsTable::new();
        assert!(!odds.insert(OutcomeCategory::Tie, 0.0));
        assert!(!odds.insert(OutcomeCategory::Tie, -2.0));
        assert!(!odds.insert(OutcomeCategory::Tie, f64::NAN));
        assert!(!odds.insert(OutcomeCategory::Unknown, 2.0));
        assert!(odds.is_empty());
    }

    #[test]
    fn lowest_quote() {
        let odds: OddsTable = [
            (OutcomeCategory::PlayerWin, 1.95),
            (OutcomeCategory::BankerWin, 1.85),
            (OutcomeCategory::Tie, 8.5),
        ]
        .into_iter()
        .collect();
        assert_eq!(odds.lowest(), Some(1.85));
        assert_eq!(OddsTable::new().lowest(), None);
    }

    #[test]
    fn degraded_observation_is_all_defaults() {
        let obs = RoundObservation::degraded(EntityId::new("9"), Source::Live, Utc::now());
        assert_eq!(obs.outcome, OutcomeCategory::Unknown);
        assert_eq!((obs.primary_score, obs.secondary_score), (0, 0));
        assert!(obs.odds.is_empty());
        assert_eq!(obs.reference_odd, 1.0);
    }

    #[test]
    fn phase_parsing() {
        assert_eq!(GamePhase::from_label("Result"), GamePhase::Result);
        assert_eq!(GamePhase::from_label("betting"), GamePhase::Betting);
        assert_eq!(GamePhase::from_label("???"), GamePhase::Betting);
    }
}
