//! Repository implementations:
//! - `local`: In-memory implementation for development and tests
//! - `postgres`: PostgreSQL implementation with Diesel ORM
pub mod local;
#[cfg(feature = "postgres-repo")]
pub mod postgres;

pub use local::LocalRepository;
#[cfg(feature = "postgres-repo")]
pub use postgres::{PoolStats, PostgresConfig, PostgresRepository};
