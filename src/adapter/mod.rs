//! Implementations of ports (hexagonal adapters).

pub mod feed;
pub mod scorer;
pub mod store;
