//! Wall-clock helpers.
//!
//! Slots are local wall-clock times with minute resolution. They travel over
//! the wire as `"HH:MM"` and dates as ISO `YYYY-MM-DD`.

use chrono::{NaiveDate, NaiveTime, Timelike};

pub const DATE_FORMAT: &str = "%Y-%m-%d";
pub const SLOT_FORMAT: &str = "%H:%M";

/// Minutes in a day; upper bound for slot intervals.
pub const MINUTES_PER_DAY: u32 = 24 * 60;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TimeParseError {
    #[error("invalid date '{0}' (expected YYYY-MM-DD)")]
    Date(String),
    #[error("invalid time '{0}' (expected HH:MM, 24h)")]
    Time(String),
}

/// Parse an ISO `YYYY-MM-DD` date.
pub fn parse_date(value: &str) -> Result<NaiveDate, TimeParseError> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT)
        .map_err(|_| TimeParseError::Date(value.to_string()))
}

/// Parse a `HH:MM` slot time. `HH:MM:SS` is accepted and truncated to the minute.
pub fn parse_slot_time(value: &str) -> Result<NaiveTime, TimeParseError> {
    let trimmed = value.trim();
    NaiveTime::parse_from_str(trimmed, SLOT_FORMAT)
        .or_else(|_| NaiveTime::parse_from_str(trimmed, "%H:%M:%S"))
        .map(truncate_to_minute)
        .map_err(|_| TimeParseError::Time(value.to_string()))
}

pub fn format_slot(time: NaiveTime) -> String {
    time.format(SLOT_FORMAT).to_string()
}

pub fn truncate_to_minute(time: NaiveTime) -> NaiveTime {
    NaiveTime::from_hms_opt(time.hour(), time.minute(), 0).unwrap_or(time)
}

pub fn minutes_since_midnight(time: NaiveTime) -> u32 {
    time.hour() * 60 + time.minute()
}

/// Inverse of [`minutes_since_midnight`]; `None` past the end of the day.
pub fn time_from_minutes(minutes: u32) -> Option<NaiveTime> {
    if minutes >= MINUTES_PER_DAY {
        return None;
    }
    NaiveTime::from_hms_opt(minutes / 60, minutes % 60, 0)
}

/// Serde adapter for `NaiveTime` as `"HH:MM"`.
pub mod hhmm {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&super::format_slot(*time))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        super::parse_slot_time(&raw).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_date() {
        assert_eq!(
            parse_date("2024-12-25").unwrap(),
            NaiveDate::from_ymd_opt(2024, 12, 25).unwrap()
        );
        assert!(matches!(parse_date("25/12/2024"), Err(TimeParseError::Date(_))));
    }

    #[test]
    fn test_parse_slot_time_truncates_seconds() {
        let t = parse_slot_time("18:30:45").unwrap();
        assert_eq!(t, NaiveTime::from_hms_opt(18, 30, 0).unwrap());
        assert_eq!(format_slot(t), "18:30");
    }

    #[test]
    fn test_parse_slot_time_rejects_garbage() {
        assert!(parse_slot_time("25:00").is_err());
        assert!(parse_slot_time("noon").is_err());
    }

    #[test]
    fn test_minutes_roundtrip_bounds() {
        assert_eq!(time_from_minutes(0), NaiveTime::from_hms_opt(0, 0, 0));
        assert_eq!(time_from_minutes(MINUTES_PER_DAY - 1), NaiveTime::from_hms_opt(23, 59, 0));
        assert_eq!(time_from_minutes(MINUTES_PER_DAY), None);
        let t = NaiveTime::from_hms_opt(9, 15, 0).unwrap();
        assert_eq!(minutes_since_midnight(t), 555);
    }
}
