//! Source-agnostic domain logic: observations, rolling statistics,
//! feature assembly, backoff and merge rules.

pub mod backoff;
pub mod features;
pub mod id;
pub mod merge;
pub mod observation;
pub mod outcome;
pub mod prediction;
pub mod stats;
pub mod window;

pub use backoff::{BackoffController, BackoffPolicy, FailureState};
pub use features::{FeatureAssembler, FeatureKey, FeatureSchema, FeatureVector, TimePolicy};
pub use id::EntityId;
pub use merge::{MergeDeduplicator, MergeLimits};
pub use observation::{GamePhase, OddsTable, RoundObservation, Source};
pub use outcome::OutcomeCategory;
pub use prediction::{PredictionRecord, Probabilities, ScoredOutcome};
pub use stats::{RollingStatsTracker, WindowSummary};
pub use window::RollingWindow;
