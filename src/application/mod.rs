//! Application services (use cases).
//!
//! These services drive domain logic through the ports: normalization at
//! the boundary, the lock-guarded pipeline, the poll loop and the
//! orchestrator that exposes read snapshots.

pub mod cache;
pub mod fetcher;
pub mod normalizer;
pub mod orchestrator;
pub mod pipeline;

pub use fetcher::{FetchHealth, Fetcher, PollOutcome};
pub use normalizer::Normalizer;
pub use orchestrator::{Orchestrator, OrchestratorSettings, StatusReport};
pub use pipeline::{IngestReport, MergedMatch, Pipeline, PipelineOptions};
