//! Scoring port.

use crate::domain::{FeatureVector, OutcomeCategory, ScoredOutcome};
use crate::error::ScoringError;

/// A loaded classifier: feature vector in, label and distribution out.
///
/// Implementations are pure and loaded once at startup. The pipeline builds
/// vectors in the order given by [`feature_names`](Self::feature_names).
pub trait Scorer: Send + Sync {
    /// Expected input columns, in order.
    fn feature_names(&self) -> &[String];

    /// Categories the model can emit.
    fn labels(&self) -> &[OutcomeCategory];

    /// Score one vector.
    ///
    /// # Errors
    /// [`ScoringError::SchemaMismatch`] when the vector length differs from
    /// the model's, [`ScoringError::InvalidDistribution`] when the model
    /// output is not a probability distribution.
    fn score(&self, features: &FeatureVector) -> Result<ScoredOutcome, ScoringError>;
}
