//! Player and owner profiles.

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::{ServiceError, ServiceResult};
use crate::db::repository::AccountRepository;
use crate::models::{Gender, OwnerProfile, PlayerProfile, PlayerStatus, Side, User, UserId};

/// Player profile with the age computed for the day it was read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerProfileView {
    #[serde(flatten)]
    pub profile: PlayerProfile,
    pub age: i32,
}

impl PlayerProfileView {
    pub fn new(profile: PlayerProfile, today: NaiveDate) -> Self {
        let age = profile.age_on(today);
        Self { profile, age }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct PlayerProfileData {
    pub sport: String,
    pub full_name: String,
    pub birth_date: Option<NaiveDate>,
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
}

fn required(value: &str, field: &str) -> ServiceResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ServiceError::validation(format!("{} is required", field)));
    }
    Ok(trimmed.to_string())
}

fn optional_text(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn positive(value: Option<i32>, field: &str) -> ServiceResult<Option<i32>> {
    match value {
        Some(v) if v <= 0 => Err(ServiceError::validation(format!(
            "{} must be positive",
            field
        ))),
        other => Ok(other),
    }
}

pub async fn upsert_player_profile<R: AccountRepository + ?Sized>(
    repo: &R,
    user: &User,
    data: PlayerProfileData,
    today: NaiveDate,
) -> ServiceResult<PlayerProfileView> {
    if !user.is_player() {
        return Err(ServiceError::forbidden("Only players have a player profile"));
    }

    let birth_date = data
        .birth_date
        .ok_or_else(|| ServiceError::validation("birth_date is required"))?;
    if birth_date > today {
        return Err(ServiceError::validation("birth_date cannot be in the future"));
    }

    let profile = PlayerProfile {
        user_id: user.id,
        sport: required(&data.sport, "sport")?,
        full_name: required(&data.full_name, "full_name")?,
        birth_date,
        position: required(&data.position, "position")?,
        dominant_foot: data.dominant_foot,
        dominant_hand: data.dominant_hand,
        gender: data.gender,
        height_cm: positive(data.height_cm, "height_cm")?,
        weight_kg: positive(data.weight_kg, "weight_kg")?,
        status: data.status,
        city: optional_text(data.city),
        phone: optional_text(data.phone),
        picture_url: optional_text(data.picture_url),
        updated_at: Utc::now(),
    };

    let saved = repo.upsert_player_profile(profile).await?;
    if !user.profile_completed {
        repo.set_profile_completed(user.id, true).await?;
    }
    log::debug!("Saved player profile for user {}", user.id);

    Ok(PlayerProfileView::new(saved, today))
}

pub async fn get_player_profile<R: AccountRepository + ?Sized>(
    repo: &R,
    user_id: UserId,
    today: NaiveDate,
) -> ServiceResult<PlayerProfileView> {
    repo.get_player_profile(user_id)
        .await?
        .map(|p| PlayerProfileView::new(p, today))
        .ok_or_else(|| {
            ServiceError::not_found(format!("Player profile for user {} not found", user_id))
        })
}

pub async fn upsert_owner_profile<R: AccountRepository + ?Sized>(
    repo: &R,
    user: &User,
    admin_name: &str,
    phone: &str,
) -> ServiceResult<OwnerProfile> {
    if !user.is_owner() {
        return Err(ServiceError::forbidden("Only owners have an owner profile"));
    }

    let admin_name = required(admin_name, "admin_name")?;
    let phone = required(phone, "phone")?;

    let saved = repo.upsert_owner_profile(user.id, admin_name, phone).await?;
    if !user.profile_completed {
        repo.set_profile_completed(user.id, true).await?;
    }
    Ok(saved)
}

pub async fn get_owner_profile<R: AccountRepository + ?Sized>(
    repo: &R,
    user_id: UserId,
) -> ServiceResult<OwnerProfile> {
    repo.get_owner_profile(user_id).await?.ok_or_else(|| {
        ServiceError::not_found(format!("Owner profile for user {} not found", user_id))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::LocalRepository;
    use crate::models::{NewUser, Role};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    async fn user(repo: &LocalRepository, email: &str, role: Role) -> User {
        repo.create_user(NewUser {
            name: "Test".into(),
            email: email.into(),
            password_hash: "x".into(),
            role,
            terms_accepted: true,
        })
        .await
        .unwrap()
    }

    fn data() -> PlayerProfileData {
        PlayerProfileData {
            sport: "futbol".into(),
            full_name: "Ana Pérez".into(),
            birth_date: Some(date(2000, 6, 15)),
            position: "defensa".into(),
            dominant_foot: Some(Side::Right),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_player_profile_marks_completed_and_computes_age() {
        let repo = LocalRepository::new();
        let player = user(&repo, "p@example.com", Role::Player).await;

        let view = upsert_player_profile(&repo, &player, data(), date(2024, 6, 14))
            .await
            .unwrap();
        assert_eq!(view.age, 23);
        assert!(repo.get_user(player.id).await.unwrap().profile_completed);

        let fetched = get_player_profile(&repo, player.id, date(2024, 6, 15))
            .await
            .unwrap();
        assert_eq!(fetched.age, 24);
    }

    #[tokio::test]
    async fn test_owner_cannot_write_player_profile() {
        let repo = LocalRepository::new();
        let owner = user(&repo, "o@example.com", Role::Owner).await;
        let err = upsert_player_profile(&repo, &owner, data(), date(2024, 1, 1))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Forbidden(_)));
    }

    #[tokio::test]
    async fn test_player_profile_requires_fields() {
        let repo = LocalRepository::new();
        let player = user(&repo, "p@example.com", Role::Player).await;
        let missing = PlayerProfileData {
            position: "  ".into(),
            ..data()
        };
        let err = upsert_player_profile(&repo, &player, missing, date(2024, 1, 1))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Validation(ref m) if m.contains("position")));
    }

    #[tokio::test]
    async fn test_owner_profile_roundtrip() {
        let repo = LocalRepository::new();
        let owner = user(&repo, "o@example.com", Role::Owner).await;
        assert!(matches!(
            get_owner_profile(&repo, owner.id).await,
            Err(ServiceError::NotFound(_))
        ));

        upsert_owner_profile(&repo, &owner, "Club Norte", "+34 600 000 000")
            .await
            .unwrap();
        let profile = get_owner_profile(&repo, owner.id).await.unwrap();
        assert_eq!(profile.admin_name, "Club Norte");
    }
}
