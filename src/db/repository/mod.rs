//! Repository trait definitions for persistence operations.
//!
//! Storage is split into focused traits, one per aggregate:
//!
//! - [`error`]: Error types for repository operations
//! - [`accounts`]: Users and their player/owner profiles
//! - [`courts`]: Courts with schedules, images, rules and amenities; holidays
//! - [`reservations`]: Slot reservations
//! - [`posts`]: Social feed (posts, comments, likes)
//!
//! # Convenience Trait Bound
//!
//! Services and handlers hold an `Arc<dyn FullRepository>`:
//!
//! ```ignore
//! async fn book<R: FullRepository + ?Sized>(repo: &R, new: NewReservation) -> RepositoryResult<()> {
//!     let court = repo.get_court(new.court_id).await?;
//!     repo.create_reservation(new).await?;
//!     Ok(())
//! }
//! ```

pub mod accounts;
pub mod courts;
pub mod error;
pub mod posts;
pub mod reservations;

pub use error::{ErrorContext, RepositoryError, RepositoryResult};

pub use accounts::AccountRepository;
pub use courts::CourtRepository;
pub use posts::PostRepository;
pub use reservations::ReservationRepository;

/// Composite trait bound for a complete repository implementation.
///
/// Automatically implemented for any type that implements all four
/// repository traits.
pub trait FullRepository:
    AccountRepository + CourtRepository + ReservationRepository + PostRepository
{
}

impl<T> FullRepository for T where
    T: AccountRepository + CourtRepository + ReservationRepository + PostRepository
{
}
