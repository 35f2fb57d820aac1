//! Mock [`LiveSource`] and live event builders.
//!
//! [`ScriptedSource`] pops one scripted result per fetch. In cycling mode
//! the script repeats forever; otherwise an exhausted script returns an
//! empty list.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::json;

use crate::error::FetchError;
use crate::port::{HistoricalRecord, LiveEvent, LiveSource};

/// Live event with the given scores and a single Player Win odd. The phase
/// is left out, so it follows from the scores.
pub fn live_event(id: i64, player: u32, banker: u32) -> LiveEvent {
    LiveEvent {
        event_id: Some(json!(id)),
        event_name: Some(format!("Round {id}")),
        start_time: Some(json!(1_715_779_200 + id * 60)),
        is_live: true,
        round_number: Some(json!(id)),
        player_score: Some(json!(player)),
        banker_score: Some(json!(banker)),
        game_phase: None,
        betting_options: vec![crate::port::BettingOption {
            option_type: "Player Win".into(),
            odd: Some(1.95),
        }],
    }
}

/// Historical record settled in `label` with the given scores.
pub fn historical_record(id: i64, label: &str, player: u32, banker: u32) -> HistoricalRecord {
    HistoricalRecord {
        id: Some(id),
        event_id: id.to_string(),
        collected_at: Some(format!("2024-05-15T12:{:02}:00Z", id % 60)),
        option_type: Some(label.into()),
        odd: Some(1.95),
        round_state: Some(
            json!({"playerScore": player, "bankerScore": banker, "roundNumber": id, "isLive": false})
                .to_string(),
        ),
        raw_payload: None,
    }
}

type Script = Result<Vec<LiveEvent>, FetchError>;

/// A mock live source with a scripted result queue.
pub struct ScriptedSource {
    script: Mutex<VecDeque<Script>>,
    cycle: bool,
    delay: Option<Duration>,
    calls: AtomicU32,
}

impl ScriptedSource {
    pub fn new(script: Vec<Script>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            cycle: false,
            delay: None,
            calls: AtomicU32::new(0),
        }
    }

    /// Repeat `script` forever.
    pub fn cycling(script: Vec<Script>) -> Self {
        Self {
            cycle: true,
            ..Self::new(script)
        }
    }

    /// Sleep before answering each fetch.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }

    fn next(&self) -> Script {
        let mut script = self.script.lock();
        let next = script.pop_front().unwrap_or(Ok(Vec::new()));
        if self.cycle {
            script.push_back(next.clone());
        }
        next
    }
}

#[async_trait]
impl LiveSource for ScriptedSource {
    async fn fetch(&self) -> Result<Vec<LiveEvent>, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.delay {
            Some(delay) => tokio::time::sleep(delay).await,
            None => tokio::task::yield_now().await,
        }
        self.next()
    }

    fn name(&self) -> &str {
        "scripted"
    }
}
