//! Wire format of the live feed.
//!
//! The feed answers `{"Value": [...]}`. Each entry uses terse keys:
//! `Id`, `L` (name), `S` (start, epoch seconds), `I` (round number),
//! `SC.S1`/`SC.S2` (player/banker score) and `E[]` (odds, `T` type code,
//! `C` multiplier).

use serde::Deserialize;
use serde_json::Value;

use crate::domain::OutcomeCategory;
use crate::port::{BettingOption, LiveEvent};

/// Top-level response body.
#[derive(Debug, Default, Deserialize)]
pub struct FeedEnvelope {
    #[serde(rename = "Value", default)]
    pub value: Vec<Value>,
}

impl FeedEnvelope {
    /// Entries for `sport_id`, as live events, in feed order.
    #[must_use]
    pub fn into_events(self, sport_id: u64) -> Vec<LiveEvent> {
        self.value
            .iter()
            .filter(|entry| entry.get("SportId").and_then(Value::as_u64) == Some(sport_id))
            .map(to_live_event)
            .collect()
    }
}

fn to_live_event(entry: &Value) -> LiveEvent {
    let score = |key: &str| {
        entry
            .get("SC")
            .and_then(|sc| sc.get(key))
            .cloned()
            .unwrap_or(Value::from(0))
    };
    let player_score = score("S1");
    let banker_score = score("S2");
    let positive = |v: &Value| v.as_f64().is_some_and(|n| n > 0.0);
    let phase = if positive(&player_score) || positive(&banker_score) {
        "Result"
    } else {
        "Betting"
    };

    LiveEvent {
        event_id: entry.get("Id").cloned(),
        event_name: Some(
            entry
                .get("L")
                .and_then(Value::as_str)
                .unwrap_or("Unknown Event")
                .to_string(),
        ),
        start_time: entry.get("S").cloned(),
        is_live: true,
        round_number: entry.get("I").cloned(),
        player_score: Some(player_score),
        banker_score: Some(banker_score),
        game_phase: Some(phase.to_string()),
        betting_options: betting_options(entry),
    }
}

fn betting_options(entry: &Value) -> Vec<BettingOption> {
    let Some(odds) = entry.get("E").and_then(Value::as_array) else {
        return Vec::new();
    };
    odds.iter()
        .filter_map(|odd| {
            let category = odd
                .get("T")
                .and_then(Value::as_u64)
                .and_then(OutcomeCategory::from_option_code)?;
            Some(BettingOption {
                option_type: category.label().to_string(),
                odd: Some(odd.get("C").and_then(Value::as_f64).unwrap_or(1.0)),
            })
        })
        .collect()
}
