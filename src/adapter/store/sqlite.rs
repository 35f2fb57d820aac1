//! SQLite round archive.
//!
//! Serves both store ports: listing past rounds for seeding and merging,
//! and appending rounds the live feed reports as settled.

use async_trait::async_trait;
use diesel::prelude::*;

use super::connection::DbPool;
use super::model::{NewRoundRow, RoundRow};
use super::schema::rounds;
use crate::error::{Error, Result};
use crate::port::{HistoricalRecord, HistoricalSource, HistoryArchive};

/// SQLite-backed round archive.
pub struct SqliteRoundStore {
    pool: DbPool,
}

impl SqliteRoundStore {
    #[must_use]
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Number of archived rounds.
    ///
    /// # Errors
    /// Returns an error if the query fails.
    pub fn count(&self) -> Result<i64> {
        let mut conn = self
            .pool
            .get()
            .map_err(|e| Error::Connection(e.to_string()))?;
        rounds::table
            .count()
            .get_result(&mut conn)
            .map_err(|e| Error::Database(e.to_string()))
    }
}

#[async_trait]
impl HistoricalSource for SqliteRoundStore {
    async fn list_recent(&self, limit: usize) -> Result<Vec<HistoricalRecord>> {
        let mut conn = self
            .pool
            .get()
            .map_err(|e| Error::Connection(e.to_string()))?;

        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let rows: Vec<RoundRow> = rounds::table
            .order(rounds::id.desc())
            .limit(limit)
            .select(RoundRow::as_select())
            .load(&mut conn)
            .map_err(|e| Error::Database(e.to_string()))?;

        Ok(rows.into_iter().map(HistoricalRecord::from).collect())
    }
}

#[async_trait]
impl HistoryArchive for SqliteRoundStore {
    async fn append(&self, record: &HistoricalRecord) -> Result<bool> {
        let mut conn = self
            .pool
            .get()
            .map_err(|e| Error::Connection(e.to_string()))?;

        let inserted = diesel::insert_or_ignore_into(rounds::table)
            .values(NewRoundRow::from(record))
            .execute(&mut conn)
            .map_err(|e| Error::Database(e.to_string()))?;

        Ok(inserted > 0)
    }
}
