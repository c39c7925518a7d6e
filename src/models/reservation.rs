use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use super::time::hhmm;
use super::{CourtId, CourtSummary, ReservationId, UserId};
use crate::string_enum;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReservationStatus {
    Pending,
    Confirmed,
    Cancelled,
    Finished,
}

string_enum!(ReservationStatus, "reservation status", {
    Pending => "pending",
    Confirmed => "confirmed",
    Cancelled => "cancelled",
    Finished => "finished",
});

impl ReservationStatus {
    /// Active reservations hold their slot.
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Pending | Self::Confirmed)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reservation {
    pub id: ReservationId,
    pub court_id: CourtId,
    pub user_id: UserId,
    pub date: NaiveDate,
    #[serde(with = "hhmm")]
    pub start_time: NaiveTime,
    pub status: ReservationStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Reservation {
    pub fn starts_at(&self) -> NaiveDateTime {
        self.date.and_time(self.start_time)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewReservation {
    pub court_id: CourtId,
    pub user_id: UserId,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub status: ReservationStatus,
}

/// Reservation listing entry with the booked court embedded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReservationDetail {
    #[serde(flatten)]
    pub reservation: Reservation,
    pub court: Option<CourtSummary>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_active_statuses() {
        assert!(ReservationStatus::Pending.is_active());
        assert!(ReservationStatus::Confirmed.is_active());
        assert!(!ReservationStatus::Cancelled.is_active());
        assert!(!ReservationStatus::Finished.is_active());
    }

    #[test]
    fn test_status_parse_is_case_insensitive() {
        assert_eq!(
            "CONFIRMED".parse::<ReservationStatus>().unwrap(),
            ReservationStatus::Confirmed
        );
        let err = "finalizado".parse::<ReservationStatus>().unwrap_err();
        assert_eq!(err.value, "finalizado");
    }
}
