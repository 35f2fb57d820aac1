//! Shared test utilities available to both unit and integration tests.
//!
//! Enabled via `#[cfg(test)]` (unit tests) or the `testkit` feature
//! (integration tests).
//!
//! # Modules
//!
//! - [`feed`]: Scripted [`LiveSource`](crate::port::LiveSource) and round
//!   builders.
//! - [`scorer`]: Deterministic [`Scorer`](crate::port::Scorer).
//! - [`store`]: In-memory history and archive.
//! - [`config`]: Canonical test configurations.

pub mod config;
pub mod feed;
pub mod scorer;
pub mod store;
