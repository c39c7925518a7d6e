//! Court repository trait: court listings and the holiday calendar.

use async_trait::async_trait;
use chrono::NaiveDate;

use super::error::RepositoryResult;
use crate::models::{Court, CourtId, Holiday, NewCourt, NewHoliday, UserId};

/// Repository trait for courts and holidays.
///
/// A court is stored together with its images, schedule ranges, rules and
/// amenities; reads always return the fully assembled [`Court`].
#[async_trait]
pub trait CourtRepository: Send + Sync {
    // ==================== Courts ====================

    /// Store a court and all of its child rows in one unit.
    ///
    /// # Arguments
    /// * `court` - The court to insert; images are stored in vector order
    ///
    /// # Returns
    /// * `Ok(Court)` - The assembled court with assigned IDs
    async fn create_court(&self, court: NewCourt) -> RepositoryResult<Court>;

    /// # Returns
    /// * `Err(RepositoryError::NotFound)` - If the court doesn't exist
    async fn get_court(&self, court_id: CourtId) -> RepositoryResult<Court>;

    /// Courts with status `active`, newest first.
    async fn list_active_courts(&self) -> RepositoryResult<Vec<Court>>;

    /// Every court of one owner regardless of status, newest first.
    async fn list_courts_by_owner(&self, owner_id: UserId) -> RepositoryResult<Vec<Court>>;

    // ==================== Holidays ====================

    /// # Returns
    /// * `Err(RepositoryError::ConflictError)` - If the date already has a holiday
    async fn create_holiday(&self, holiday: NewHoliday) -> RepositoryResult<Holiday>;

    async fn get_holiday(&self, date: NaiveDate) -> RepositoryResult<Option<Holiday>>;

    /// All holidays ordered by date.
    async fn list_holidays(&self) -> RepositoryResult<Vec<Holiday>>;
}
