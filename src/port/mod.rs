//! Trait definitions (hexagonal ports). Depend only on domain.
//!
//! # Available Ports
//!
//! - [`LiveSource`] - Live round feed
//! - [`HistoricalSource`], [`HistoryArchive`] - Past rounds, read and append
//! - [`Scorer`] - Loaded outcome classifier

mod feed;
mod scorer;
mod store;

pub use feed::{BettingOption, HistoricalRecord, LiveEvent, LiveSource, RawRound};
pub use scorer::Scorer;
pub use store::{HistoricalSource, HistoryArchive};
