//! In-memory history and archive.

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::error::{Error, Result};
use crate::port::{HistoricalRecord, HistoricalSource, HistoryArchive};

/// Records kept in insertion order. Serves both store ports.
#[derive(Default)]
pub struct MemoryArchive {
    records: Mutex<Vec<HistoricalRecord>>,
    unavailable: bool,
}

impl MemoryArchive {
    /// Archive pre-loaded with `records`, oldest first.
    pub fn with_records(records: Vec<HistoricalRecord>) -> Self {
        Self {
            records: Mutex::new(records),
            unavailable: false,
        }
    }

    /// Archive whose every call fails.
    pub fn unavailable() -> Self {
        Self {
            records: Mutex::default(),
            unavailable: true,
        }
    }

    /// Stored records, oldest first.
    pub fn records(&self) -> Vec<HistoricalRecord> {
        self.records.lock().clone()
    }

    fn check(&self) -> Result<()> {
        if self.unavailable {
            return Err(Error::Connection("archive offline".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl HistoricalSource for MemoryArchive {
    async fn list_recent(&self, limit: usize) -> Result<Vec<HistoricalRecord>> {
        self.check()?;
        Ok(self
            .records
            .lock()
            .iter()
            .rev()
            .take(limit)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl HistoryArchive for MemoryArchive {
    async fn append(&self, record: &HistoricalRecord) -> Result<bool> {
        self.check()?;
        let mut records = self.records.lock();
        let duplicate = records
            .iter()
            .any(|r| r.event_id == record.event_id && r.option_type == record.option_type);
        if duplicate {
            return Ok(false);
        }
        records.push(record.clone());
        Ok(true)
    }
}
