//! Deterministic scorer for tests.

use std::collections::BTreeMap;

use crate::domain::features::DEFAULT_FEATURES;
use crate::domain::{FeatureVector, OutcomeCategory, Probabilities, ScoredOutcome};
use crate::error::ScoringError;
use crate::port::Scorer;

/// Always returns the same distribution. Rejects vectors whose length
/// differs from its feature list.
pub struct FixedScorer {
    features: Vec<String>,
    labels: Vec<OutcomeCategory>,
    distribution: BTreeMap<OutcomeCategory, f64>,
}

impl FixedScorer {
    /// Favours Banker Win (0.6 / 0.3 / 0.1) over the default columns.
    pub fn banker() -> Self {
        let distribution: BTreeMap<_, _> = [
            (OutcomeCategory::BankerWin, 0.6),
            (OutcomeCategory::PlayerWin, 0.3),
            (OutcomeCategory::Tie, 0.1),
        ]
        .into_iter()
        .collect();
        Self {
            features: DEFAULT_FEATURES.iter().map(|s| (*s).to_string()).collect(),
            labels: OutcomeCategory::PRIMARY.to_vec(),
            distribution,
        }
    }

    /// Banker scorer expecting `width` anonymous columns.
    pub fn with_width(width: usize) -> Self {
        Self::banker().with_features((0..width).map(|i| format!("f{i}")))
    }

    pub fn with_features<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.features = names.into_iter().map(Into::into).collect();
        self
    }
}

impl Scorer for FixedScorer {
    fn feature_names(&self) -> &[String] {
        &self.features
    }

    fn labels(&self) -> &[OutcomeCategory] {
        &self.labels
    }

    fn score(&self, features: &FeatureVector) -> Result<ScoredOutcome, ScoringError> {
        if features.len() != self.features.len() {
            return Err(ScoringError::SchemaMismatch {
                expected: self.features.len(),
                actual: features.len(),
            });
        }
        let probabilities = Probabilities::new(self.distribution.clone())?;
        let (label, _) = probabilities.argmax();
        Ok(ScoredOutcome {
            label,
            probabilities,
        })
    }
}
