//! Raw payload normalization.
//!
//! Both raw shapes are converted into [`RoundObservation`] here and nowhere
//! else. Failures are typed ([`NormalizationError`]); [`Normalizer::recover`]
//! is the single policy deciding what a failure degrades to.

use chrono::{DateTime, Local, NaiveDateTime, TimeZone, Utc};
use serde_json::Value;
use tracing::{debug, warn};

use crate::domain::{
    EntityId, GamePhase, OddsTable, OutcomeCategory, RoundObservation, Source, TimePolicy,
};
use crate::error::NormalizationError;
use crate::port::{BettingOption, HistoricalRecord, LiveEvent, RawRound};

/// Converts raw rounds into canonical observations.
#[derive(Debug, Clone, Copy, Default)]
pub struct Normalizer {
    time_policy: TimePolicy,
}

impl Normalizer {
    /// `time_policy` decides how timestamps without an offset are read.
    #[must_use]
    pub fn new(time_policy: TimePolicy) -> Self {
        Self { time_policy }
    }

    /// Strict conversion. `received_at` stands in for a missing or
    /// unparsable timestamp.
    ///
    /// # Errors
    /// See [`NormalizationError`].
    pub fn normalize(
        &self,
        raw: &RawRound,
        received_at: DateTime<Utc>,
    ) -> Result<RoundObservation, NormalizationError> {
        match raw {
            RawRound::Live(event) => self.normalize_live(event, received_at),
            RawRound::Historical(record) => self.normalize_historical(record, received_at),
        }
    }

    /// Conversion that never fails the caller: errors are logged and passed
    /// through [`recover`](Self::recover).
    #[must_use]
    pub fn normalize_lenient(
        &self,
        raw: &RawRound,
        received_at: DateTime<Utc>,
    ) -> Option<RoundObservation> {
        match self.normalize(raw, received_at) {
            Ok(observation) => Some(observation),
            Err(err) => {
                let recovered = Self::recover(err.clone(), received_at);
                if recovered.is_some() {
                    debug!(error = %err, "Substituting defaults for malformed round");
                } else {
                    warn!(error = %err, "Dropping round without identity");
                }
                recovered
            }
        }
    }

    /// Recovery policy for a failed normalization.
    ///
    /// A round without an id cannot be keyed and is dropped. Every other
    /// failure yields the degraded observation: zero scores, neutral odds,
    /// `Unknown` outcome.
    #[must_use]
    pub fn recover(
        err: NormalizationError,
        received_at: DateTime<Utc>,
    ) -> Option<RoundObservation> {
        match err {
            NormalizationError::MissingEntityId { .. } => None,
            NormalizationError::MissingScores { entity_id, origin }
            | NormalizationError::MalformedState {
                entity_id, origin, ..
            } => Some(RoundObservation::degraded(entity_id, origin, received_at)),
        }
    }

    /// # Errors
    /// See [`NormalizationError`].
    pub fn normalize_live(
        &self,
        event: &LiveEvent,
        received_at: DateTime<Utc>,
    ) -> Result<RoundObservation, NormalizationError> {
        let origin = Source::Live;
        let entity_id = event
            .event_id
            .as_ref()
            .and_then(EntityId::from_json)
            .ok_or(NormalizationError::MissingEntityId { origin })?;

        let (primary, secondary) = scores(
            event.player_score.as_ref(),
            event.banker_score.as_ref(),
            &entity_id,
            origin,
        )?;

        let phase = match event.game_phase.as_deref() {
            Some(label) => GamePhase::from_label(label),
            None if primary > 0 || secondary > 0 => GamePhase::Result,
            None => GamePhase::Betting,
        };
        let outcome = match phase {
            GamePhase::Result => OutcomeCategory::from_scores(primary, secondary),
            GamePhase::Betting => OutcomeCategory::Pending,
        };

        let odds = odds_from_options(&event.betting_options);
        let observed_at = event
            .start_time
            .as_ref()
            .and_then(|v| parse_timestamp(v, self.time_policy))
            .unwrap_or(received_at);

        let mut observation = RoundObservation::new(entity_id, outcome, origin, observed_at)
            .with_scores(primary, secondary);
        observation.reference_odd = odds.lowest().unwrap_or(OddsTable::NEUTRAL);
        observation.odds = odds;
        observation.round_number = lenient_u32(event.round_number.as_ref());
        observation.is_live = event.is_live;
        observation.phase = phase;
        observation.name = event.event_name.clone();
        Ok(observation)
    }

    /// # Errors
    /// See [`NormalizationError`].
    pub fn normalize_historical(
        &self,
        record: &HistoricalRecord,
        received_at: DateTime<Utc>,
    ) -> Result<RoundObservation, NormalizationError> {
        let origin = Source::Historical;
        let trimmed = record.event_id.trim();
        if trimmed.is_empty() {
            return Err(NormalizationError::MissingEntityId { origin });
        }
        let entity_id = EntityId::new(trimmed);

        let state = match record.round_state.as_deref().map(str::trim) {
            None | Some("") => {
                return Err(NormalizationError::MissingScores { entity_id, origin });
            }
            Some(text) => match serde_json::from_str::<Value>(text) {
                Ok(Value::Object(map)) => map,
                Ok(other) => {
                    return Err(NormalizationError::MalformedState {
                        entity_id,
                        origin,
                        reason: format!("round_state is not an object: {other}"),
                    });
                }
                Err(err) => {
                    return Err(NormalizationError::MalformedState {
                        entity_id,
                        origin,
                        reason: format!("round_state: {err}"),
                    });
                }
            },
        };

        let (primary, secondary) = scores(
            state.get("playerScore"),
            state.get("bankerScore"),
            &entity_id,
            origin,
        )?;

        let outcome = record
            .option_type
            .as_deref()
            .map_or(OutcomeCategory::Unknown, OutcomeCategory::from_label);

        let observed_at = record
            .collected_at
            .as_deref()
            .and_then(|s| parse_timestamp_str(s, self.time_policy))
            .unwrap_or(received_at);

        let payload = record
            .raw_payload
            .as_deref()
            .and_then(|text| serde_json::from_str::<Value>(text).ok());

        let mut observation = RoundObservation::new(entity_id, outcome, origin, observed_at)
            .with_scores(primary, secondary);
        observation.reference_odd = record
            .odd
            .filter(|odd| odd.is_finite() && *odd > 0.0)
            .unwrap_or(OddsTable::NEUTRAL);
        observation.round_number = lenient_u32(state.get("roundNumber"));
        observation.is_live = state
            .get("isLive")
            .and_then(Value::as_bool)
            .unwrap_or(false);
        observation.phase = GamePhase::Result;
        if let Some(payload) = payload.as_ref() {
            observation.odds = payload
                .get("bettingOptions")
                .and_then(|v| serde_json::from_value::<Vec<BettingOption>>(v.clone()).ok())
                .map(|options| odds_from_options(&options))
                .unwrap_or_default();
            observation.name = payload
                .pointer("/event/eventName")
                .and_then(Value::as_str)
                .map(str::to_string);
        }
        Ok(observation)
    }
}

/// Read both scores. At least one must be present; a missing one counts as 0.
fn scores(
    primary: Option<&Value>,
    secondary: Option<&Value>,
    entity_id: &EntityId,
    origin: Source,
) -> Result<(u32, u32), NormalizationError> {
    let read = |value: Option<&Value>, field: &str| {
        parse_u32(value).map_err(|reason| NormalizationError::MalformedState {
            entity_id: entity_id.clone(),
            origin,
            reason: format!("{field}: {reason}"),
        })
    };
    match (read(primary, "playerScore")?, read(secondary, "bankerScore")?) {
        (None, None) => Err(NormalizationError::MissingScores {
            entity_id: entity_id.clone(),
            origin,
        }),
        (p, s) => Ok((p.unwrap_or(0), s.unwrap_or(0))),
    }
}

/// `Ok(None)` for absent/null/blank, `Err` for anything not a non-negative
/// integer.
fn parse_u32(value: Option<&Value>) -> Result<Option<u32>, String> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => {
            if let Some(u) = n.as_u64() {
                return u32::try_from(u).map(Some).map_err(|_| format!("{u} out of range"));
            }
            match n.as_f64() {
                Some(f) if f >= 0.0 && f.fract() == 0.0 && f <= f64::from(u32::MAX) => {
                    Ok(Some(f as u32))
                }
                _ => Err(format!("{n} is not a non-negative integer")),
            }
        }
        Some(Value::String(s)) if s.trim().is_empty() => Ok(None),
        Some(Value::String(s)) => s
            .trim()
            .parse::<u32>()
            .map(Some)
            .map_err(|_| format!("{s:?} is not a non-negative integer")),
        Some(other) => Err(format!("unexpected value {other}")),
    }
}

fn lenient_u32(value: Option<&Value>) -> u32 {
    parse_u32(value).ok().flatten().unwrap_or(0)
}

fn odds_from_options(options: &[BettingOption]) -> OddsTable {
    options
        .iter()
        .filter_map(|option| {
            let odd = option.odd?;
            Some((OutcomeCategory::from_label(&option.option_type), odd))
        })
        .collect()
}

fn parse_timestamp(value: &Value, policy: TimePolicy) -> Option<DateTime<Utc>> {
    match value {
        Value::Number(n) => from_epoch(n.as_f64()?),
        Value::String(s) => parse_timestamp_str(s, policy),
        _ => None,
    }
}

/// RFC 3339, epoch seconds, or a naive `YYYY-MM-DD[T ]HH:MM:SS` prefix read
/// in the policy's timezone.
fn parse_timestamp_str(raw: &str, policy: TimePolicy) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(at) = DateTime::parse_from_rfc3339(raw) {
        return Some(at.with_timezone(&Utc));
    }
    if let Ok(secs) = raw.parse::<f64>() {
        return from_epoch(secs);
    }
    let prefix = raw.get(..19).unwrap_or(raw);
    let naive = NaiveDateTime::parse_from_str(prefix, "%Y-%m-%dT%H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(prefix, "%Y-%m-%d %H:%M:%S"))
        .ok()?;
    match policy {
        TimePolicy::Utc => Some(naive.and_utc()),
        TimePolicy::Local => Local
            .from_local_datetime(&naive)
            .earliest()
            .map(|at| at.with_timezone(&Utc)),
    }
}

fn from_epoch(secs: f64) -> Option<DateTime<Utc>> {
    if !secs.is_finite() || secs < 0.0 {
        return None;
    }
    let whole = secs.trunc();
    let nanos = ((secs - whole) * 1e9) as u32;
    DateTime::from_timestamp(whole as i64, nanos)
}
