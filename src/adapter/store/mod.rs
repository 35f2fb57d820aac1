//! SQLite persistence for past rounds.

pub mod connection;
mod model;
mod schema;
mod settings;
mod sqlite;

pub use connection::{create_pool, run_migrations, DbPool};
pub use settings::HistoryConfig;
pub use sqlite::SqliteRoundStore;
