//! Outcome categories for a settled (or pending) round.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The enumerated result of a round.
///
/// The five settled categories are the ones a round can end in and the ones a
/// scorer can predict. `Pending` marks a live round that has not been dealt
/// yet; `Unknown` marks a raw value that could not be interpreted. Neither of
/// the two is ever folded into rolling statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum OutcomeCategory {
    #[serde(rename = "Player Win")]
    PlayerWin,
    #[serde(rename = "Banker Win")]
    BankerWin,
    #[serde(rename = "Tie")]
    Tie,
    #[serde(rename = "Player Pair")]
    PlayerPair,
    #[serde(rename = "Banker Pair")]
    BankerPair,
    #[serde(rename = "Pending")]
    Pending,
    #[serde(rename = "Unknown")]
    Unknown,
}

impl OutcomeCategory {
    /// Every category a round can settle in, in model label order.
    pub const SETTLED: [Self; 5] = [
        Self::PlayerWin,
        Self::BankerWin,
        Self::Tie,
        Self::PlayerPair,
        Self::BankerPair,
    ];

    /// The three main-bet outcomes. The neutral moving average is an equal
    /// split across these.
    pub const PRIMARY: [Self; 3] = [Self::PlayerWin, Self::BankerWin, Self::Tie];

    /// Human-readable label, as used by the feeds and the model files.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::PlayerWin => "Player Win",
            Self::BankerWin => "Banker Win",
            Self::Tie => "Tie",
            Self::PlayerPair => "Player Pair",
            Self::BankerPair => "Banker Pair",
            Self::Pending => "Pending",
            Self::Unknown => "Unknown",
        }
    }

    /// Label with spaces replaced by underscores (`Player_Win`), the form
    /// used inside feature names.
    #[must_use]
    pub fn feature_key(self) -> String {
        self.label().replace(' ', "_")
    }

    /// Parse a raw label. Case-insensitive; spaces and underscores are
    /// interchangeable; `PLAYER`/`BANKER` are accepted as win shorthands.
    /// Anything unrecognized maps to [`OutcomeCategory::Unknown`].
    #[must_use]
    pub fn from_label(raw: &str) -> Self {
        let normalized = raw.trim().replace('_', " ").to_ascii_lowercase();
        match normalized.as_str() {
            "player win" | "player" => Self::PlayerWin,
            "banker win" | "banker" => Self::BankerWin,
            "tie" => Self::Tie,
            "player pair" => Self::PlayerPair,
            "banker pair" => Self::BankerPair,
            "pending" => Self::Pending,
            _ => Self::Unknown,
        }
    }

    /// Map a feed betting-option type code (1..=5) to its category.
    #[must_use]
    pub fn from_option_code(code: u64) -> Option<Self> {
        match code {
            1 => Some(Self::PlayerWin),
            2 => Some(Self::BankerWin),
            3 => Some(Self::Tie),
            4 => Some(Self::PlayerPair),
            5 => Some(Self::BankerPair),
            _ => None,
        }
    }

    /// Decide the main-bet winner from final hand scores.
    #[must_use]
    pub fn from_scores(primary: u32, secondary: u32) -> Self {
        match primary.cmp(&secondary) {
            std::cmp::Ordering::Greater => Self::PlayerWin,
            std::cmp::Ordering::Less => Self::BankerWin,
            std::cmp::Ordering::Equal => Self::Tie,
        }
    }

    /// True for categories a round can actually end in.
    #[must_use]
    pub const fn is_settled(self) -> bool {
        !matches!(self, Self::Pending | Self::Unknown)
    }

    /// True when the observation may be handed to a scorer.
    #[must_use]
    pub const fn is_scorable(self) -> bool {
        !matches!(self, Self::Unknown)
    }
}

impl fmt::Display for OutcomeCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_round_trip() {
        for category in OutcomeCategory::SETTLED {
            assert_eq!(OutcomeCategory::from_label(category.label()), category);
        }
    }

    #[test]
    fn parsing_is_lenient_about_case_and_separators() {
        assert_eq!(OutcomeCategory::from_label("PLAYER"), OutcomeCategory::PlayerWin);
        assert_eq!(OutcomeCategory::from_label("banker_win"), OutcomeCategory::BankerWin);
        assert_eq!(OutcomeCategory::from_label(" TIE "), OutcomeCategory::Tie);
    }

    #[test]
    fn unrecognized_labels_are_unknown() {
        assert_eq!(OutcomeCategory::from_label("Dragon"), OutcomeCategory::Unknown);
        assert_eq!(OutcomeCategory::from_label(""), OutcomeCategory::Unknown);
    }

    #[test]
    fn winner_follows_scores() {
        assert_eq!(OutcomeCategory::from_scores(8, 3), OutcomeCategory::PlayerWin);
        assert_eq!(OutcomeCategory::from_scores(2, 9), OutcomeCategory::BankerWin);
        assert_eq!(OutcomeCategory::from_scores(6, 6), OutcomeCategory::Tie);
    }

    #[test]
    fn pending_and_unknown_are_not_settled() {
        assert!(!OutcomeCategory::Pending.is_settled());
        assert!(!OutcomeCategory::Unknown.is_settled());
        assert!(OutcomeCategory::Pending.is_scorable());
        assert!(!OutcomeCategory::Unknown.is_scorable());
    }

    #[test]
    fn option_codes_cover_settled_categories() {
        let mapped: Vec<_> = (1..=5)
            .filter_map(OutcomeCategory::from_option_code)
            .collect();
        assert_eq!(mapped, OutcomeCategory::SETTLED.to_vec());
        assert!(OutcomeCategory::from_option_code(9).is_none());
    }

    #[test]
    fn feature_key_uses_underscores() {
        assert_eq!(OutcomeCategory::BankerPair.feature_key(), "Banker_Pair");
    }
}
