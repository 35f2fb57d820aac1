//! Historical round persistence ports.

use async_trait::async_trait;

use super::feed::HistoricalRecord;
use crate::error::Result;

/// Append-only listing of past rounds.
#[async_trait]
pub trait HistoricalSource: Send + Sync {
    /// Up to `limit` records, most recent first.
    async fn list_recent(&self, limit: usize) -> Result<Vec<HistoricalRecord>>;
}

/// Sink for rounds seen settling on the live feed.
#[async_trait]
pub trait HistoryArchive: Send + Sync {
    /// Store a record unless one with the same event id and outcome exists.
    /// Returns `true` when a row was written.
    async fn append(&self, record: &HistoricalRecord) -> Result<bool>;
}
