//! Scorer output and cached predictions.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::id::EntityId;
use super::outcome::OutcomeCategory;
use crate::error::ScoringError;

/// Tolerance on the probability mass.
pub const PROBABILITY_EPSILON: f64 = 1e-6;

/// A validated probability distribution over outcome categories.
///
/// Every value is in `[0, 1]` and the values sum to 1 within
/// [`PROBABILITY_EPSILON`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Probabilities(BTreeMap<OutcomeCategory, f64>);

impl Probabilities {
    /// Validate and wrap a distribution.
    ///
    /// # Errors
    /// Returns [`ScoringError::InvalidDistribution`] for an empty map, a
    /// negative or non-finite value, or a total outside `1 ± epsilon`.
    pub fn new(values: BTreeMap<OutcomeCategory, f64>) -> Result<Self, ScoringError> {
        if values.is_empty() {
            return Err(ScoringError::InvalidDistribution("no categories".into()));
        }
        for (category, p) in &values {
            if !p.is_finite() || *p < 0.0 {
                return Err(ScoringError::InvalidDistribution(format!(
                    "{category} has probability {p}"
                )));
            }
        }
        let total: f64 = values.values().sum();
        if (total - 1.0).abs() > PROBABILITY_EPSILON {
            return Err(ScoringError::InvalidDistribution(format!(
                "probabilities sum to {total}"
            )));
        }
        Ok(Self(values))
    }

    /// Probability for a category; `0.0` if the model does not emit it.
    #[must_use]
    pub fn get(&self, category: OutcomeCategory) -> f64 {
        self.0.get(&category).copied().unwrap_or(0.0)
    }

    /// The most likely category and its probability. Ties resolve to the
    /// category that sorts first.
    #[must_use]
    pub fn argmax(&self) -> (OutcomeCategory, f64) {
        let mut best = (OutcomeCategory::Unknown, f64::NEG_INFINITY);
        for (category, p) in &self.0 {
            if *p > best.1 {
                best = (*category, *p);
            }
        }
        best
    }

    pub fn iter(&self) -> impl Iterator<Item = (OutcomeCategory, f64)> + '_ {
        self.0.iter().map(|(c, p)| (*c, *p))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// What a scorer returns for one feature vector.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredOutcome {
    pub label: OutcomeCategory,
    pub probabilities: Probabilities,
}

/// Latest prediction for one entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionRecord {
    pub entity_id: EntityId,
    pub label: OutcomeCategory,
    pub probabilities: Probabilities,
    /// Highest probability in the distribution.
    pub confidence: f64,
    pub computed_at: DateTime<Utc>,
}

impl PredictionRecord {
    #[must_use]
    pub fn new(entity_id: EntityId, scored: ScoredOutcome, computed_at: DateTime<Utc>) -> Self {
        let (_, confidence) = scored.probabilities.argmax();
        Self {
            entity_id,
            label: scored.label,
            probabilities: scored.probabilities,
            confidence,
            computed_at,
        }
    }
}
