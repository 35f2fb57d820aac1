//! Live feed port and the raw payload shapes both feeds deliver.
//!
//! Raw shapes are deliberately loose (`serde_json::Value` for anything the
//! upstream has been seen to send as either a number or a string). They are
//! turned into [`RoundObservation`](crate::domain::RoundObservation)s by the
//! normalizer and never inspected downstream.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::domain::RoundObservation;
use crate::error::FetchError;

/// One offered bet on a live round.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BettingOption {
    /// Outcome label, e.g. `Player Win`.
    pub option_type: String,
    #[serde(default)]
    pub odd: Option<f64>,
}

/// Round as delivered by the live source.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LiveEvent {
    pub event_id: Option<Value>,
    pub event_name: Option<String>,
    /// Epoch seconds or an ISO-8601 string.
    pub start_time: Option<Value>,
    pub is_live: bool,
    pub round_number: Option<Value>,
    pub player_score: Option<Value>,
    pub banker_score: Option<Value>,
    /// `Betting` or `Result`.
    pub game_phase: Option<String>,
    pub betting_options: Vec<BettingOption>,
}

/// Row as stored by the round archive.
///
/// `round_state` and `raw_payload` are JSON documents embedded as text.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoricalRecord {
    pub id: Option<i64>,
    pub event_id: String,
    pub collected_at: Option<String>,
    /// Outcome label the round settled in.
    pub option_type: Option<String>,
    pub odd: Option<f64>,
    pub round_state: Option<String>,
    pub raw_payload: Option<String>,
}

impl HistoricalRecord {
    /// Archive form of a settled live round.
    #[must_use]
    pub fn archived(
        observation: &RoundObservation,
        raw: &LiveEvent,
        collected_at: DateTime<Utc>,
    ) -> Self {
        let odd = observation
            .odds
            .iter()
            .find(|(category, _)| *category == observation.outcome)
            .map(|(_, odd)| odd);
        let round_state = json!({
            "playerScore": observation.primary_score,
            "bankerScore": observation.secondary_score,
            "roundNumber": observation.round_number,
            "isLive": observation.is_live,
        });
        let raw_payload = json!({
            "event": {
                "eventId": observation.entity_id.as_str(),
                "eventName": raw.event_name,
                "startTime": raw.start_time,
            },
            "bettingOptions": raw.betting_options,
        });

        Self {
            id: None,
            event_id: observation.entity_id.to_string(),
            collected_at: Some(collected_at.to_rfc3339()),
            option_type: Some(observation.outcome.label().to_string()),
            odd,
            round_state: Some(round_state.to_string()),
            raw_payload: Some(raw_payload.to_string()),
        }
    }
}

/// Either raw shape, tagged at the boundary.
#[derive(Debug, Clone, PartialEq)]
pub enum RawRound {
    Live(LiveEvent),
    Historical(HistoricalRecord),
}

/// Request/response live source.
#[async_trait]
pub trait LiveSource: Send + Sync {
    /// Fetch the rounds currently on offer.
    ///
    /// # Errors
    /// Any non-2xx response, undecodable body or transport failure.
    async fn fetch(&self) -> Result<Vec<LiveEvent>, FetchError>;

    /// Short name used in logs.
    fn name(&self) -> &str {
        "live"
    }
}
