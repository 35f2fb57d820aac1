//! Live feed adapter.

mod client;
mod envelope;
mod settings;

pub use client::HttpLiveSource;
pub use envelope::FeedEnvelope;
pub use settings::{BackoffConfig, FeedConfig};
