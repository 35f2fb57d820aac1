//! Feature vector assembly.
//!
//! A [`FeatureSchema`] is an ordered list of feature names. Each name is
//! parsed once into a [`FeatureKey`] that knows where its value comes from:
//! observation fields, time-of-observation fields, per-category odds, or the
//! rolling tracker. Names that match no resolver produce `0.0`.

use chrono::{DateTime, Datelike, Local, Timelike, Utc};
use serde::{Deserialize, Serialize};

use super::observation::RoundObservation;
use super::outcome::OutcomeCategory;
use super::stats::RollingStatsTracker;

/// Columns of the stock model, in model order.
pub const DEFAULT_FEATURES: [&str; 17] = [
    "player_score",
    "banker_score",
    "round_number",
    "is_live",
    "odd_value",
    "hour",
    "day_of_week",
    "minute",
    "player_win_odd",
    "banker_win_odd",
    "tie_odd",
    "Player_Win_ma_5",
    "Banker_Win_ma_5",
    "Tie_ma_5",
    "consecutive_Player_Win",
    "consecutive_Banker_Win",
    "consecutive_Tie",
];

/// Timezone used to derive hour, minute and weekday features.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimePolicy {
    /// Host local time.
    #[default]
    Local,
    Utc,
}

/// Where a single feature value is read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeatureKey {
    PrimaryScore,
    SecondaryScore,
    RoundNumber,
    IsLive,
    ReferenceOdd,
    Hour,
    /// Monday = 0.
    DayOfWeek,
    Minute,
    Odds(OutcomeCategory),
    MovingAverage(OutcomeCategory, usize),
    ConsecutiveRun(OutcomeCategory),
    Unresolved,
}

impl FeatureKey {
    #[must_use]
    pub fn parse(name: &str) -> Self {
        match name {
            "player_score" => return Self::PrimaryScore,
            "banker_score" => return Self::SecondaryScore,
            "round_number" => return Self::RoundNumber,
            "is_live" => return Self::IsLive,
            "odd_value" => return Self::ReferenceOdd,
            "hour" => return Self::Hour,
            "day_of_week" => return Self::DayOfWeek,
            "minute" => return Self::Minute,
            _ => {}
        }

        if let Some(label) = name.strip_prefix("consecutive_") {
            return settled(label).map_or(Self::Unresolved, Self::ConsecutiveRun);
        }
        if let Some((label, size)) = name.rsplit_once("_ma_") {
            return match (settled(label), size.parse::<usize>()) {
                (Some(category), Ok(size)) => Self::MovingAverage(category, size),
                _ => Self::Unresolved,
            };
        }
        if let Some(label) = name.strip_suffix("_odd") {
            return settled(label).map_or(Self::Unresolved, Self::Odds);
        }
        Self::Unresolved
    }
}

fn settled(label: &str) -> Option<OutcomeCategory> {
    let category = OutcomeCategory::from_label(label);
    category.is_settled().then_some(category)
}

/// Ordered feature names together with their parsed resolvers.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureSchema {
    names: Vec<String>,
    keys: Vec<FeatureKey>,
}

impl FeatureSchema {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names: Vec<String> = names.into_iter().map(Into::into).collect();
        let keys = names.iter().map(|n| FeatureKey::parse(n)).collect();
        Self { names, keys }
    }

    #[must_use]
    pub fn names(&self) -> &[String] {
        &self.names
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Names no resolver recognises. They are still emitted, as zeros.
    pub fn unresolved(&self) -> impl Iterator<Item = &str> {
        self.names
            .iter()
            .zip(&self.keys)
            .filter(|(_, key)| **key == FeatureKey::Unresolved)
            .map(|(name, _)| name.as_str())
    }
}

impl Default for FeatureSchema {
    fn default() -> Self {
        Self::new(DEFAULT_FEATURES)
    }
}

/// Numeric scorer input, in schema order.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector(Vec<f64>);

impl FeatureVector {
    #[must_use]
    pub fn new(values: Vec<f64>) -> Self {
        Self(values)
    }

    #[must_use]
    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Turns an observation plus tracker state into a [`FeatureVector`].
#[derive(Debug, Clone, Default)]
pub struct FeatureAssembler {
    schema: FeatureSchema,
    time_policy: TimePolicy,
}

impl FeatureAssembler {
    #[must_use]
    pub fn new(schema: FeatureSchema, time_policy: TimePolicy) -> Self {
        Self {
            schema,
            time_policy,
        }
    }

    #[must_use]
    pub fn schema(&self) -> &FeatureSchema {
        &self.schema
    }

    #[must_use]
    pub fn time_policy(&self) -> TimePolicy {
        self.time_policy
    }

    /// Always returns exactly `schema.len()` values.
    #[must_use]
    pub fn assemble(
        &self,
        observation: &RoundObservation,
        tracker: &RollingStatsTracker,
    ) -> FeatureVector {
        let clock = Clock::new(observation.observed_at, self.time_policy);
        let values = self
            .schema
            .keys
            .iter()
            .map(|key| resolve(*key, observation, tracker, &clock))
            .collect();
        FeatureVector(values)
    }
}

struct Clock {
    hour: u32,
    minute: u32,
    weekday: u32,
}

impl Clock {
    fn new(at: DateTime<Utc>, policy: TimePolicy) -> Self {
        match policy {
            TimePolicy::Utc => Self::from_parts(&at),
            TimePolicy::Local => Self::from_parts(&at.with_timezone(&Local)),
        }
    }

    fn from_parts<T: Timelike + Datelike>(at: &T) -> Self {
        Self {
            hour: at.hour(),
            minute: at.minute(),
            weekday: at.weekday().num_days_from_monday(),
        }
    }
}

fn resolve(
    key: FeatureKey,
    obs: &RoundObservation,
    tracker: &RollingStatsTracker,
    clock: &Clock,
) -> f64 {
    match key {
        FeatureKey::PrimaryScore => f64::from(obs.primary_score),
        FeatureKey::SecondaryScore => f64::from(obs.secondary_score),
        FeatureKey::RoundNumber => f64::from(obs.round_number),
        FeatureKey::IsLive => {
            if obs.is_live {
                1.0
            } else {
                0.0
            }
        }
        FeatureKey::ReferenceOdd => obs.reference_odd,
        FeatureKey::Hour => f64::from(clock.hour),
        FeatureKey::DayOfWeek => f64::from(clock.weekday),
        FeatureKey::Minute => f64::from(clock.minute),
        FeatureKey::Odds(category) => obs.odds.get(category),
        FeatureKey::MovingAverage(category, size) => tracker.moving_average(category, size),
        FeatureKey::ConsecutiveRun(category) => tracker.consecutive_run(category) as f64,
        FeatureKey::Unresolved => 0.0,
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::domain::id::EntityId;
    use crate::domain::observation::{OddsTable, Source};

    fn at_utc(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
    }

    fn observation() -> RoundObservation {
        let mut obs = RoundObservation::new(
            EntityId::new("77"),
            OutcomeCategory::Pending,
            Source::Live,
            // A Wednesday.
            at_utc(2024, 5, 15, 13, 42),
        )
        .with_scores(4, 6)
        .with_odds(
            [
                (OutcomeCategory::PlayerWin, 1.95),
                (OutcomeCategory::BankerWin, 1.9),
            ]
            .into_iter()
            .collect::<OddsTable>(),
        );
        obs.round_number = 12;
        obs.is_live = true;
        obs.reference_odd = 1.9;
        obs
    }

    fn settled(id: usize, outcome: OutcomeCategory) -> RoundObservation {
        RoundObservation::new(
            EntityId::new(id.to_string()),
            outcome,
            Source::Historical,
            at_utc(2024, 5, 15, 12, 0),
        )
    }

    #[test]
    fn parses_known_names() {
        assert_eq!(FeatureKey::parse("player_score"), FeatureKey::PrimaryScore);
        assert_eq!(
            FeatureKey::parse("Banker_Win_ma_5"),
            FeatureKey::MovingAverage(OutcomeCategory::BankerWin, 5)
        );
        assert_eq!(
            FeatureKey::parse("Player_Pair_ma_20"),
            FeatureKey::MovingAverage(OutcomeCategory::PlayerPair, 20)
        );
        assert_eq!(
            FeatureKey::parse("consecutive_Tie"),
            FeatureKey::ConsecutiveRun(OutcomeCategory::Tie)
        );
        assert_eq!(
            FeatureKey::parse("banker_pair_odd"),
            FeatureKey::Odds(OutcomeCategory::BankerPair)
        );
    }

    #[test]
    fn unknown_names_are_unresolved() {
        for name in ["shoe_count", "Dragon_ma_5", "Tie_ma_x", "consecutive_", "pending_odd"] {
            assert_eq!(FeatureKey::parse(name), FeatureKey::Unresolved, "{name}");
        }
    }

    #[test]
    fn assembles_default_schema_in_order() {
        let mut tracker = RollingStatsTracker::new(10);
        for (i, outcome) in [
            OutcomeCategory::BankerWin,
            OutcomeCategory::PlayerWin,
            OutcomeCategory::PlayerWin,
        ]
        .into_iter()
        .enumerate()
        {
            tracker.push(settled(i, outcome));
        }

        let assembler = FeatureAssembler::new(FeatureSchema::default(), TimePolicy::Utc);
        let vector = assembler.assemble(&observation(), &tracker);

        assert_eq!(vector.len(), DEFAULT_FEATURES.len());
        let v = vector.as_slice();
        assert_eq!(&v[..8], &[4.0, 6.0, 12.0, 1.0, 1.9, 13.0, 2.0, 42.0]);
        // Odds, with tie missing.
        assert_eq!(&v[8..11], &[1.95, 1.9, 1.0]);
        assert!((v[11] - 2.0 / 3.0).abs() < 1e-12);
        assert!((v[12] - 1.0 / 3.0).abs() < 1e-12);
        assert_eq!(v[13], 0.0);
        assert_eq!(&v[14..], &[2.0, 0.0, 0.0]);
    }

    #[test]
    fn unresolved_names_emit_zero() {
        let schema = FeatureSchema::new(["hour", "mystery", "player_score"]);
        assert_eq!(schema.unresolved().collect::<Vec<_>>(), vec!["mystery"]);

        let assembler = FeatureAssembler::new(schema, TimePolicy::Utc);
        let vector = assembler.assemble(&observation(), &RollingStatsTracker::new(5));
        assert_eq!(vector.as_slice(), &[13.0, 0.0, 4.0]);
    }

    #[test]
    fn degraded_observation_still_fills_schema() {
        let obs = RoundObservation::degraded(EntityId::new("x"), Source::Live, Utc::now());
        let assembler = FeatureAssembler::default();
        let vector = assembler.assemble(&obs, &RollingStatsTracker::new(5));
        assert_eq!(vector.len(), DEFAULT_FEATURES.len());
        assert_eq!(&vector.as_slice()[..4], &[0.0, 0.0, 0.0, 0.0]);
    }
}
