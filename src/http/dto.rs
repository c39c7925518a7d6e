//! Request and response bodies of the REST API.
//!
//! Request types derive [`Validate`]; handlers call `validate()` before
//! handing data to the service layer. Domain responses are serialized
//! straight from the types in [`crate::api`].

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Deserializer, Serialize};
use validator::Validate;

use crate::models::time::{hhmm, parse_date};
use crate::models::{
    CourtId, CourtStatus, DayOfWeek, Gender, NewCourt, NewCourtSchedule, PageRequest,
    PlayerStatus, PostKind, Role, Side, UserId,
};
use crate::services::courts::DEFAULT_SLOT_INTERVAL_MINUTES;
use crate::services::profiles::PlayerProfileData;

use super::error::AppError;

/// Distinguishes an absent field (`None`) from an explicit `null` (`Some(None)`).
fn double_option<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

// =============================================================================
// Accounts
// =============================================================================

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 1, max = 255, message = "name must be 1-255 characters"))]
    pub name: String,
    #[validate(email(message = "email is not valid"))]
    pub email: String,
    #[validate(length(min = 8, message = "password must be at least 8 characters"))]
    pub password: String,
    #[serde(default)]
    pub role: Option<Role>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ChangePasswordRequest {
    #[validate(length(min = 1, message = "current_password is required"))]
    pub current_password: String,
    #[validate(length(min = 8, message = "new_password must be at least 8 characters"))]
    pub new_password: String,
    pub confirm_password: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ChangeEmailRequest {
    #[validate(length(min = 1, message = "password is required"))]
    pub password: String,
    #[validate(email(message = "new_email is not valid"))]
    pub new_email: String,
    pub confirm_email: String,
}

// =============================================================================
// Profiles
// =============================================================================

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct PlayerProfileRequest {
    #[validate(length(min = 1, max = 50))]
    pub sport: String,
    #[validate(length(min = 1, max = 255))]
    pub full_name: String,
    pub birth_date: NaiveDate,
    #[validate(length(min = 1, max = 50))]
    pub position: String,
    pub dominant_foot: Option<Side>,
    pub dominant_hand: Option<Side>,
    pub gender: Option<Gender>,
    #[validate(range(min = 50, max = 260))]
    pub height_cm: Option<i32>,
    #[validate(range(min = 20, max = 300))]
    pub weight_kg: Option<i32>,
    pub status: Option<PlayerStatus>,
    #[validate(length(max = 100))]
    pub city: Option<String>,
    #[validate(length(max = 30))]
    pub phone: Option<String>,
    #[validate(url)]
    pub picture_url: Option<String>,
}

impl From<PlayerProfileRequest> for PlayerProfileData {
    fn from(req: PlayerProfileRequest) -> Self {
        Self {
            sport: req.sport,
            full_name: req.full_name,
            birth_date: Some(req.birth_date),
            position: req.position,
            dominant_foot: req.dominant_foot,
            dominant_hand: req.dominant_hand,
            gender: req.gender,
            height_cm: req.height_cm,
            weight_kg: req.weight_kg,
            status: req.status,
            city: req.city,
            phone: req.phone,
            picture_url: req.picture_url,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct OwnerProfileRequest {
    #[validate(length(min = 1, max = 255))]
    pub admin_name: String,
    #[validate(length(min = 1, max = 30))]
    pub phone: String,
}

// =============================================================================
// Courts
// =============================================================================

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ScheduleRequest {
    pub day: DayOfWeek,
    #[serde(with = "hhmm")]
    pub start_time: NaiveTime,
    #[serde(with = "hhmm")]
    pub end_time: NaiveTime,
    #[validate(range(min = 1, max = 1440))]
    pub interval_minutes: Option<u32>,
    pub available: Option<bool>,
}

impl From<ScheduleRequest> for NewCourtSchedule {
    fn from(req: ScheduleRequest) -> Self {
        Self {
            day: req.day,
            start_time: req.start_time,
            end_time: req.end_time,
            interval_minutes: req
                .interval_minutes
                .unwrap_or(DEFAULT_SLOT_INTERVAL_MINUTES),
            available: req.available.unwrap_or(true),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateCourtRequest {
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    #[validate(length(min = 1, max = 50))]
    pub sport: String,
    #[validate(length(min = 1, max = 50))]
    pub subtype: String,
    #[validate(length(min = 1, max = 255))]
    pub address: String,
    #[validate(range(min = -90.0, max = 90.0))]
    pub latitude: f64,
    #[validate(range(min = -180.0, max = 180.0))]
    pub longitude: f64,
    #[validate(length(min = 1))]
    pub full_address: String,
    #[validate(length(min = 1, max = 50))]
    pub surface: String,
    #[validate(range(min = 1))]
    pub capacity: i32,
    #[validate(range(min = 0.0))]
    pub price_per_hour: f64,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub status: CourtStatus,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    #[validate(nested)]
    pub schedules: Vec<ScheduleRequest>,
    #[serde(default)]
    pub rules: Vec<String>,
    #[serde(default)]
    pub amenities: Vec<String>,
}

impl CreateCourtRequest {
    /// Owner is filled in from the caller.
    pub fn into_new_court(self, owner_id: UserId) -> NewCourt {
        NewCourt {
            owner_id,
            name: self.name,
            sport: self.sport,
            subtype: self.subtype,
            address: self.address,
            latitude: self.latitude,
            longitude: self.longitude,
            full_address: self.full_address,
            surface: self.surface,
            capacity: self.capacity,
            price_per_hour: self.price_per_hour,
            description: self.description,
            status: self.status,
            image_urls: self.images,
            schedules: self.schedules.into_iter().map(Into::into).collect(),
            rules: self.rules,
            amenities: self.amenities,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateHolidayRequest {
    pub date: NaiveDate,
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[serde(default)]
    pub working_day: bool,
}

// =============================================================================
// Reservations
// =============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct CreateReservationRequest {
    pub court_id: CourtId,
    pub date: NaiveDate,
    #[serde(with = "hhmm")]
    pub start_time: NaiveTime,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DateQuery {
    pub date: Option<String>,
}

impl DateQuery {
    pub fn required_date(&self) -> Result<NaiveDate, AppError> {
        let raw = self
            .date
            .as_deref()
            .ok_or_else(|| AppError::BadRequest("date query parameter is required".into()))?;
        Ok(parse_date(raw)?)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CourtDateQuery {
    pub court_id: Option<CourtId>,
    pub date: Option<String>,
}

impl CourtDateQuery {
    pub fn required(&self) -> Result<(CourtId, NaiveDate), AppError> {
        let court_id = self
            .court_id
            .ok_or_else(|| AppError::BadRequest("court_id query parameter is required".into()))?;
        let date = DateQuery {
            date: self.date.clone(),
        }
        .required_date()?;
        Ok((court_id, date))
    }
}

// =============================================================================
// Posts
// =============================================================================

#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

impl From<PageQuery> for PageRequest {
    fn from(q: PageQuery) -> Self {
        PageRequest::new(q.page, q.per_page)
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreatePostRequest {
    #[serde(default = "default_post_kind")]
    pub kind: PostKind,
    #[validate(length(min = 1, max = 5000))]
    pub content: String,
    pub image_url: Option<String>,
}

fn default_post_kind() -> PostKind {
    PostKind::Text
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdatePostRequest {
    #[validate(length(min = 1, max = 5000))]
    pub content: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub image_url: Option<Option<String>>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateCommentRequest {
    #[validate(length(min = 1, max = 2000))]
    pub content: String,
}
