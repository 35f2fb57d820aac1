//! In-memory stores used by application services.
//!
//! - [`prediction::PredictionCache`]: Latest prediction per entity

pub mod prediction;

pub use prediction::PredictionCache;
