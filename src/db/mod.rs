//! Persistence for accounts, courts, reservations and the social feed.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────┐
//! │  HTTP handlers (axum)                                  │
//! └───────────────────┬────────────────────────────────────┘
//!                     │
//! ┌───────────────────▼────────────────────────────────────┐
//! │  Services (crate::services) - business rules           │
//! └───────────────────┬────────────────────────────────────┘
//!                     │
//! ┌───────────────────▼────────────────────────────────────┐
//! │  Repository traits (repository/) - abstract interface  │
//! └───────────────────┬────────────────────────────────────┘
//!                     │
//!     ┌───────────────┴──────────────┐
//!     │ LocalRepository (in-memory)  │  PostgresRepository (diesel, r2d2)
//!     └──────────────────────────────┘
//! ```
//!
//! Backends are chosen at runtime by [`RepositoryFactory`] from
//! `repository.toml` or the environment.

#[cfg(not(any(feature = "postgres-repo", feature = "local-repo")))]
compile_error!("Enable at least one repository backend feature.");

pub mod factory;
pub mod repo_config;
pub mod repositories;
pub mod repository;

#[cfg(feature = "postgres-repo")]
pub use repositories::postgres::{PoolStats, PostgresConfig};

pub use factory::{RepositoryBuilder, RepositoryFactory, RepositoryType};
pub use repo_config::RepositoryConfig;
pub use repositories::LocalRepository;
#[cfg(feature = "postgres-repo")]
pub use repositories::PostgresRepository;
pub use repository::{
    AccountRepository, CourtRepository, ErrorContext, FullRepository, PostRepository,
    RepositoryError, RepositoryResult, ReservationRepository,
};
