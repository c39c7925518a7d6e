use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::UserId;
use crate::string_enum;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Left,
    Right,
    Both,
}

string_enum!(Side, "side", {
    Left => "left",
    Right => "right",
    Both => "both",
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
    Other,
}

string_enum!(Gender, "gender", {
    Male => "male",
    Female => "female",
    Other => "other",
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlayerStatus {
    Active,
    Inactive,
    Injured,
}

string_enum!(PlayerStatus, "player status", {
    Active => "active",
    Inactive => "inactive",
    Injured => "injured",
});

/// Sporting profile attached to a player account (one per user).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerProfile {
    pub user_id: UserId,
    pub sport: String,
    pub full_name: String,
    pub birth_date: NaiveDate,
    pub position: String,
    pub dominant_foot: Option<Side>,
    pub dominant_hand: Option<Side>,
    pub gender: Option<Gender>,
    pub height_cm: Option<i32>,
    pub weight_kg: Option<i32>,
    pub status: Option<PlayerStatus>,
    pub city: Option<String>,
    pub phone: Option<String>,
    pub picture_url: Option<String>,
    pub updated_at: DateTime<Utc>,
}

impl PlayerProfile {
    /// Age in whole years on `today`.
    pub fn age_on(&self, today: NaiveDate) -> i32 {
        age_on(self.birth_date, today)
    }
}

/// Whole years elapsed between `birth_date` and `today`; birthdays count on the day.
pub fn age_on(birth_date: NaiveDate, today: NaiveDate) -> i32 {
    let mut age = today.year() - birth_date.year();
    if (today.month(), today.day()) < (birth_date.month(), birth_date.day()) {
        age -= 1;
    }
    age
}

/// Contact profile attached to an owner account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OwnerProfile {
    pub user_id: UserId,
    pub admin_name: String,
    pub phone: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_age_before_and_after_birthday() {
        let birth = date(2000, 6, 15);
        assert_eq!(age_on(birth, date(2024, 6, 14)), 23);
        assert_eq!(age_on(birth, date(2024, 6, 15)), 24);
        assert_eq!(age_on(birth, date(2024, 12, 31)), 24);
    }

    #[test]
    fn test_side_labels() {
        assert_eq!("Both".parse::<Side>().unwrap(), Side::Both);
        assert!("ambidextrous".parse::<Side>().is_err());
        assert_eq!(PlayerStatus::Injured.as_str(), "injured");
    }
}
