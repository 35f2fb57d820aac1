//! Scorer implementations.

mod linear;

pub use linear::LinearScorer;
