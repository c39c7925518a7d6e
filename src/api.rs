//! Public API surface for the booking backend.
//!
//! This file consolidates the identifiers and wire types exchanged over the
//! HTTP API. All types derive Serialize/Deserialize for JSON serialization.

pub use crate::models::{
    CommentId, CourtId, HolidayId, ImageId, PostId, ReservationId, ScheduleId, UserId,
};

pub use crate::models::{
    CommentView, Court, CourtImage, CourtSchedule, CourtStatus, CourtSummary, DayOfWeek, Gender,
    Holiday, OwnerProfile, Page, Pagination, PlayerProfile, PlayerStatus, PostKind, PostView,
    Reservation, ReservationDetail, ReservationStatus, Role, Side, UserView,
};

pub use crate::services::accounts::RegisteredUser;
pub use crate::services::posts::LikeToggle;
pub use crate::services::profiles::PlayerProfileView;
pub use crate::services::reservations::{
    BookedOnDate, CancelledReservation, CourtBookingCheck, OccupiedSlots,
};

use serde::{Deserialize, Serialize};

/// Health probe payload for `GET /health`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    pub database: String,
}

impl HealthStatus {
    pub fn from_check(healthy: bool) -> Self {
        Self {
            status: if healthy { "ok" } else { "degraded" }.to_string(),
            database: if healthy { "connected" } else { "unreachable" }.to_string(),
        }
    }

    pub fn is_healthy(&self) -> bool {
        self.status == "ok"
    }
}

/// Bookable start times of one court on one date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailableSlots {
    pub court_id: CourtId,
    pub date: chrono::NaiveDate,
    pub day: DayOfWeek,
    pub holiday: Option<String>,
    pub slots: Vec<String>,
}
