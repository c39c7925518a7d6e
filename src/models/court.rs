use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use super::time::hhmm;
use super::{CourtId, HolidayId, ImageId, ScheduleId, UserId};
use crate::string_enum;

/// Day of the week a schedule range applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DayOfWeek {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

string_enum!(DayOfWeek, "day of week", {
    Monday => "monday",
    Tuesday => "tuesday",
    Wednesday => "wednesday",
    Thursday => "thursday",
    Friday => "friday",
    Saturday => "saturday",
    Sunday => "sunday",
});

impl From<chrono::Weekday> for DayOfWeek {
    fn from(day: chrono::Weekday) -> Self {
        match day {
            chrono::Weekday::Mon => Self::Monday,
            chrono::Weekday::Tue => Self::Tuesday,
            chrono::Weekday::Wed => Self::Wednesday,
            chrono::Weekday::Thu => Self::Thursday,
            chrono::Weekday::Fri => Self::Friday,
            chrono::Weekday::Sat => Self::Saturday,
            chrono::Weekday::Sun => Self::Sunday,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum CourtStatus {
    #[default]
    Active,
    Inactive,
    Maintenance,
}

string_enum!(CourtStatus, "court status", {
    Active => "active",
    Inactive => "inactive",
    Maintenance => "maintenance",
});

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CourtImage {
    pub id: ImageId,
    pub url: String,
    pub position: i32,
    pub created_at: DateTime<Utc>,
}

/// Opening range `[start_time, end_time)` split into `interval_minutes` slots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourtSchedule {
    pub id: ScheduleId,
    pub day: DayOfWeek,
    #[serde(with = "hhmm")]
    pub start_time: NaiveTime,
    #[serde(with = "hhmm")]
    pub end_time: NaiveTime,
    pub interval_minutes: u32,
    pub available: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Court {
    pub id: CourtId,
    pub owner_id: UserId,
    pub name: String,
    pub sport: String,
    pub subtype: String,
    pub address: String,
    pub latitude: f64,
    pub longitude: f64,
    pub full_address: String,
    pub surface: String,
    pub capacity: i32,
    pub price_per_hour: f64,
    pub description: String,
    pub status: CourtStatus,
    pub images: Vec<CourtImage>,
    pub schedules: Vec<CourtSchedule>,
    pub rules: Vec<String>,
    pub amenities: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Court {
    pub fn summary(&self) -> CourtSummary {
        CourtSummary {
            id: self.id,
            name: self.name.clone(),
            sport: self.sport.clone(),
            subtype: self.subtype.clone(),
            address: self.address.clone(),
            surface: self.surface.clone(),
            price_per_hour: self.price_per_hour,
            status: self.status,
            images: self.images.iter().map(|img| img.url.clone()).collect(),
        }
    }
}

/// Court fields embedded in reservation listings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CourtSummary {
    pub id: CourtId,
    pub name: String,
    pub sport: String,
    pub subtype: String,
    pub address: String,
    pub surface: String,
    pub price_per_hour: f64,
    pub status: CourtStatus,
    pub images: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCourtSchedule {
    pub day: DayOfWeek,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub interval_minutes: u32,
    pub available: bool,
}

/// Insert payload for a court and all of its child rows.
#[derive(Debug, Clone, PartialEq)]
pub struct NewCourt {
    pub owner_id: UserId,
    pub name: String,
    pub sport: String,
    pub subtype: String,
    pub address: String,
    pub latitude: f64,
    pub longitude: f64,
    pub full_address: String,
    pub surface: String,
    pub capacity: i32,
    pub price_per_hour: f64,
    pub description: String,
    pub status: CourtStatus,
    pub image_urls: Vec<String>,
    pub schedules: Vec<NewCourtSchedule>,
    pub rules: Vec<String>,
    pub amenities: Vec<String>,
}

/// A calendar date that may override the weekday schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Holiday {
    pub id: HolidayId,
    pub date: NaiveDate,
    pub name: String,
    pub working_day: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewHoliday {
    pub date: NaiveDate,
    pub name: String,
    pub working_day: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;

    #[test]
    fn test_day_of_week_from_chrono() {
        let christmas = NaiveDate::from_ymd_opt(2024, 12, 25).unwrap();
        assert_eq!(DayOfWeek::from(christmas.weekday()), DayOfWeek::Wednesday);
    }

    #[test]
    fn test_schedule_serializes_hhmm() {
        let schedule = CourtSchedule {
            id: ScheduleId::new(1),
            day: DayOfWeek::Saturday,
            start_time: NaiveTime::from_hms_opt(8, 0, 0).unwrap(),
            end_time: NaiveTime::from_hms_opt(12, 30, 0).unwrap(),
            interval_minutes: 90,
            available: true,
        };
        let json = serde_json::to_value(&schedule).unwrap();
        assert_eq!(json["day"], "saturday");
        assert_eq!(json["start_time"], "08:00");
        assert_eq!(json["end_time"], "12:30");
    }
}
