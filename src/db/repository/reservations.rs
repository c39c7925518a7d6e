//! Reservation repository trait.

use async_trait::async_trait;
use chrono::NaiveDate;

use super::error::RepositoryResult;
use crate::models::{
    CourtId, NewReservation, Reservation, ReservationId, ReservationStatus, UserId,
};

/// Repository trait for slot reservations.
///
/// Implementations must guarantee that at most one active (pending or
/// confirmed) reservation exists per `(court_id, date, start_time)`, even
/// under concurrent inserts.
#[async_trait]
pub trait ReservationRepository: Send + Sync {
    /// Insert a reservation.
    ///
    /// # Returns
    /// * `Ok(Reservation)` - The stored reservation
    /// * `Err(RepositoryError::ConflictError)` - If an active reservation already holds the slot
    async fn create_reservation(&self, reservation: NewReservation)
        -> RepositoryResult<Reservation>;

    /// # Returns
    /// * `Err(RepositoryError::NotFound)` - If the reservation doesn't exist
    async fn get_reservation(&self, reservation_id: ReservationId)
        -> RepositoryResult<Reservation>;

    /// Every reservation of a user, newest date and start time first.
    async fn list_reservations_for_user(&self, user_id: UserId)
        -> RepositoryResult<Vec<Reservation>>;

    /// Active reservations of a court on one date, ordered by start time.
    async fn list_active_reservations(
        &self,
        court_id: CourtId,
        date: NaiveDate,
    ) -> RepositoryResult<Vec<Reservation>>;

    /// Whether the user holds an active reservation on `date`, optionally
    /// restricted to one court.
    async fn user_has_active_reservation(
        &self,
        user_id: UserId,
        date: NaiveDate,
        court_id: Option<CourtId>,
    ) -> RepositoryResult<bool>;

    /// Set the status of a reservation and bump `updated_at`.
    async fn update_reservation_status(
        &self,
        reservation_id: ReservationId,
        status: ReservationStatus,
    ) -> RepositoryResult<Reservation>;

    /// Mark the user's confirmed reservations dated before `before` as finished.
    ///
    /// # Returns
    /// * `Ok(usize)` - Number of reservations updated
    async fn finish_past_reservations(
        &self,
        user_id: UserId,
        before: NaiveDate,
    ) -> RepositoryResult<usize>;
}
