//! Roundcast - live round tracking and outcome prediction.
//!
//! Polls a live feed of timed rounds, keeps bounded rolling statistics over
//! settled outcomes, assembles fixed-order feature vectors and caches one
//! prediction per round. The feed may disappear for hours; the poll loop
//! backs off and keeps serving the last known state.
//!
//! # Architecture
//!
//! - [`domain`] - Observations, rolling statistics, feature assembly,
//!   backoff schedule and the live/historical merge
//! - [`port`] - Traits at the external seams: live source, round archive,
//!   scorer
//! - [`adapter`] - HTTP feed, SQLite archive, JSON linear model
//! - [`application`] - Normalizer, prediction cache, pipeline, poll loop
//!   and orchestrator
//! - [`infrastructure`] - Configuration, logging and the composition root
//! - [`cli`] - Command-line interface
//!
//! # Example
//!
//! ```no_run
//! use roundcast::infrastructure::bootstrap::build_orchestrator;
//! use roundcast::infrastructure::config::Config;
//!
//! # async fn run() -> roundcast::error::Result<()> {
//! let config = Config::load("config.toml")?;
//! let orchestrator = build_orchestrator(&config)?;
//! orchestrator.start().await?;
//! println!("{:?}", orchestrator.status());
//! orchestrator.stop().await;
//! # Ok(())
//! # }
//! ```

pub mod adapter;
pub mod application;
pub mod cli;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod port;

#[cfg(any(test, feature = "testkit"))]
pub mod testkit;
