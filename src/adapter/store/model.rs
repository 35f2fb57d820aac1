//! Database model types for Diesel ORM.

use diesel::prelude::*;

use super::schema::rounds;
use crate::port::HistoricalRecord;

/// Database row for an archived round (queryable).
#[derive(Queryable, Selectable, Debug, Clone)]
#[diesel(table_name = rounds)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct RoundRow {
    pub id: Option<i32>,
    pub event_id: String,
    pub collected_at: Option<String>,
    pub option_type: Option<String>,
    pub odd: Option<f64>,
    pub round_state: Option<String>,
    pub raw_payload: Option<String>,
}

/// Database row for an archived round (insertable).
#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = rounds)]
pub struct NewRoundRow {
    pub event_id: String,
    pub collected_at: Option<String>,
    pub option_type: Option<String>,
    pub odd: Option<f64>,
    pub round_state: Option<String>,
    pub raw_payload: Option<String>,
}

impl From<RoundRow> for HistoricalRecord {
    fn from(row: RoundRow) -> Self {
        Self {
            id: row.id.map(i64::from),
            event_id: row.event_id,
            collected_at: row.collected_at,
            option_type: row.option_type,
            odd: row.odd,
            round_state: row.round_state,
            raw_payload: row.raw_payload,
        }
    }
}

impl From<&HistoricalRecord> for NewRoundRow {
    fn from(record: &HistoricalRecord) -> Self {
        Self {
            event_id: record.event_id.clone(),
            collected_at: record.collected_at.clone(),
            option_type: record.option_type.clone(),
            odd: record.odd,
            round_state: record.round_state.clone(),
            raw_payload: record.raw_payload.clone(),
        }
    }
}
