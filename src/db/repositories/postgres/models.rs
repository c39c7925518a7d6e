use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use diesel::prelude::*;
use std::str::FromStr;

use super::schema::{
    comment_likes, court_amenities, court_images, court_rules, court_schedules, courts, holidays,
    owner_profiles, player_profiles, post_comments, post_likes, posts, reservations, users,
};
use crate::db::repository::{ErrorContext, RepositoryError, RepositoryResult};
use crate::models::*;

/// Parse a stored enum label, reporting the column on failure.
fn parse_label<T>(column: &str, raw: &str) -> RepositoryResult<T>
where
    T: FromStr<Err = UnknownVariant>,
{
    raw.parse::<T>().map_err(|e| {
        RepositoryError::internal_with_context(
            e.to_string(),
            ErrorContext::default().with_details(format!("column={}", column)),
        )
    })
}

fn parse_optional<T>(column: &str, raw: Option<&str>) -> RepositoryResult<Option<T>>
where
    T: FromStr<Err = UnknownVariant>,
{
    raw.map(|value| parse_label(column, value)).transpose()
}

// ==================== Users & Profiles ====================

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct UserRow {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: String,
    pub profile_completed: bool,
    pub terms_accepted: bool,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl UserRow {
    pub fn into_domain(self) -> RepositoryResult<User> {
        Ok(User {
            id: UserId(self.id),
            role: parse_label("users.role", &self.role)?,
            name: self.name,
            email: self.email,
            password_hash: self.password_hash,
            profile_completed: self.profile_completed,
            terms_accepted: self.terms_accepted,
            active: self.active,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = users)]
pub struct NewUserRow {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: String,
    pub terms_accepted: bool,
}

impl From<NewUser> for NewUserRow {
    fn from(user: NewUser) -> Self {
        Self {
            name: user.name,
            email: user.email,
            password_hash: user.password_hash,
            role: user.role.as_str().to_string(),
            terms_accepted: user.terms_accepted,
        }
    }
}

#[derive(Debug, Clone, Queryable, Selectable, Insertable, AsChangeset)]
#[diesel(table_name = player_profiles)]
#[diesel(check_for_backend(diesel::pg::Pg))]
#[diesel(treat_none_as_null = true)]
pub struct PlayerProfileRow {
    pub user_id: i64,
    pub sport: String,
    pub full_name: String,
    pub birth_date: NaiveDate,
    pub position: String,
    pub dominant_foot: Option<String>,
    pub dominant_hand: Option<String>,
    pub gender: Option<String>,
    pub height_cm: Option<i32>,
    pub weight_kg: Option<i32>,
    pub status: Option<String>,
    pub city: Option<String>,
    pub phone: Option<String>,
    pub picture_url: Option<String>,
    pub updated_at: DateTime<Utc>,
}

impl From<&PlayerProfile> for PlayerProfileRow {
    fn from(p: &PlayerProfile) -> Self {
        Self {
            user_id: p.user_id.value(),
            sport: p.sport.clone(),
            full_name: p.full_name.clone(),
            birth_date: p.birth_date,
            position: p.position.clone(),
            dominant_foot: p.dominant_foot.map(|s| s.as_str().to_string()),
            dominant_hand: p.dominant_hand.map(|s| s.as_str().to_string()),
            gender: p.gender.map(|g| g.as_str().to_string()),
            height_cm: p.height_cm,
            weight_kg: p.weight_kg,
            status: p.status.map(|s| s.as_str().to_string()),
            city: p.city.clone(),
            phone: p.phone.clone(),
            picture_url: p.picture_url.clone(),
            updated_at: p.updated_at,
        }
    }
}

impl PlayerProfileRow {
    pub fn into_domain(self) -> RepositoryResult<PlayerProfile> {
        Ok(PlayerProfile {
            user_id: UserId(self.user_id),
            dominant_foot: parse_optional("player_profiles.dominant_foot", self.dominant_foot.as_deref())?,
            dominant_hand: parse_optional("player_profiles.dominant_hand", self.dominant_hand.as_deref())?,
            gender: parse_optional("player_profiles.gender", self.gender.as_deref())?,
            status: parse_optional("player_profiles.status", self.status.as_deref())?,
            sport: self.sport,
            full_name: self.full_name,
            birth_date: self.birth_date,
            position: self.position,
            height_cm: self.height_cm,
            weight_kg: self.weight_kg,
            city: self.city,
            phone: self.phone,
            picture_url: self.picture_url,
            updated_at: self.updated_at,
        })
    }
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = owner_profiles)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct OwnerProfileRow {
    pub user_id: i64,
    pub admin_name: String,
    pub phone: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<OwnerProfileRow> for OwnerProfile {
    fn from(row: OwnerProfileRow) -> Self {
        Self {
            user_id: UserId(row.user_id),
            admin_name: row.admin_name,
            phone: row.phone,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = owner_profiles)]
pub struct NewOwnerProfileRow {
    pub user_id: i64,
    pub admin_name: String,
    pub phone: String,
    pub updated_at: DateTime<Utc>,
}

// ==================== Courts ====================

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = courts)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct CourtRow {
    pub id: i64,
    pub owner_id: i64,
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
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Child rows of one court, already in display order.
#[derive(Debug, Default)]
pub struct CourtChildren {
    pub images: Vec<CourtImage>,
    pub schedules: Vec<CourtSchedule>,
    pub rules: Vec<String>,
    pub amenities: Vec<String>,
}

impl CourtRow {
    pub fn assemble(self, children: CourtChildren) -> RepositoryResult<Court> {
        Ok(Court {
            id: CourtId(self.id),
            owner_id: UserId(self.owner_id),
            status: parse_label("courts.status", &self.status)?,
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
            images: children.images,
            schedules: children.schedules,
            rules: children.rules,
            amenities: children.amenities,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = courts)]
pub struct NewCourtRow {
    pub owner_id: i64,
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
    pub status: String,
}

impl From<&NewCourt> for NewCourtRow {
    fn from(c: &NewCourt) -> Self {
        Self {
            owner_id: c.owner_id.value(),
            name: c.name.clone(),
            sport: c.sport.clone(),
            subtype: c.subtype.clone(),
            address: c.address.clone(),
            latitude: c.latitude,
            longitude: c.longitude,
            full_address: c.full_address.clone(),
            surface: c.surface.clone(),
            capacity: c.capacity,
            price_per_hour: c.price_per_hour,
            description: c.description.clone(),
            status: c.status.as_str().to_string(),
        }
    }
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = court_images)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct CourtImageRow {
    pub id: i64,
    pub court_id: i64,
    pub url: String,
    pub position: i32,
    pub created_at: DateTime<Utc>,
}

impl From<CourtImageRow> for CourtImage {
    fn from(row: CourtImageRow) -> Self {
        Self {
            id: ImageId(row.id),
            url: row.url,
            position: row.position,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = court_images)]
pub struct NewCourtImageRow {
    pub court_id: i64,
    pub url: String,
    pub position: i32,
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = court_schedules)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct CourtScheduleRow {
    pub id: i64,
    pub court_id: i64,
    pub day: String,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub interval_minutes: i32,
    pub available: bool,
}

impl CourtScheduleRow {
    pub fn into_domain(self) -> RepositoryResult<CourtSchedule> {
        let interval_minutes = u32::try_from(self.interval_minutes).map_err(|_| {
            RepositoryError::internal_with_context(
                format!("negative slot interval {}", self.interval_minutes),
                ErrorContext::default()
                    .with_entity("court_schedule")
                    .with_entity_id(self.id),
            )
        })?;
        Ok(CourtSchedule {
            id: ScheduleId(self.id),
            day: parse_label("court_schedules.day", &self.day)?,
            start_time: self.start_time,
            end_time: self.end_time,
            interval_minutes,
            available: self.available,
        })
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = court_schedules)]
pub struct NewCourtScheduleRow {
    pub court_id: i64,
    pub day: String,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub interval_minutes: i32,
    pub available: bool,
}

impl NewCourtScheduleRow {
    pub fn new(court_id: i64, s: &NewCourtSchedule) -> Self {
        Self {
            court_id,
            day: s.day.as_str().to_string(),
            start_time: s.start_time,
            end_time: s.end_time,
            interval_minutes: i32::try_from(s.interval_minutes).unwrap_or(i32::MAX),
            available: s.available,
        }
    }
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = court_rules)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct CourtRuleRow {
    pub id: i64,
    pub court_id: i64,
    pub rule: String,
    pub position: i32,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = court_rules)]
pub struct NewCourtRuleRow {
    pub court_id: i64,
    pub rule: String,
    pub position: i32,
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = court_amenities)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct CourtAmenityRow {
    pub id: i64,
    pub court_id: i64,
    pub amenity: String,
    pub position: i32,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = court_amenities)]
pub struct NewCourtAmenityRow {
    pub court_id: i64,
    pub amenity: String,
    pub position: i32,
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = holidays)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct HolidayRow {
    pub id: i64,
    pub date: NaiveDate,
    pub name: String,
    pub working_day: bool,
}

impl From<HolidayRow> for Holiday {
    fn from(row: HolidayRow) -> Self {
        Self {
            id: HolidayId(row.id),
            date: row.date,
            name: row.name,
            working_day: row.working_day,
        }
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = holidays)]
pub struct NewHolidayRow {
    pub date: NaiveDate,
    pub name: String,
    pub working_day: bool,
}

// ==================== Reservations ====================

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = reservations)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ReservationRow {
    pub id: i64,
    pub court_id: i64,
    pub user_id: i64,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ReservationRow {
    pub fn into_domain(self) -> RepositoryResult<Reservation> {
        Ok(Reservation {
            id: ReservationId(self.id),
            court_id: CourtId(self.court_id),
            user_id: UserId(self.user_id),
            date: self.date,
            start_time: self.start_time,
            status: parse_label("reservations.status", &self.status)?,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = reservations)]
pub struct NewReservationRow {
    pub court_id: i64,
    pub user_id: i64,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub status: String,
}

impl From<&NewReservation> for NewReservationRow {
    fn from(r: &NewReservation) -> Self {
        Self {
            court_id: r.court_id.value(),
            user_id: r.user_id.value(),
            date: r.date,
            start_time: r.start_time,
            status: r.status.as_str().to_string(),
        }
    }
}

// ==================== Posts ====================

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = posts)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct PostRow {
    pub id: i64,
    pub author_id: i64,
    pub kind: String,
    pub content: String,
    pub image_url: Option<String>,
    pub deleted: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PostRow {
    pub fn into_domain(self) -> RepositoryResult<Post> {
        Ok(Post {
            id: PostId(self.id),
            author_id: UserId(self.author_id),
            kind: parse_label("posts.kind", &self.kind)?,
            content: self.content,
            image_url: self.image_url,
            deleted: self.deleted,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = posts)]
pub struct NewPostRow {
    pub author_id: i64,
    pub kind: String,
    pub content: String,
    pub image_url: Option<String>,
}

impl From<&NewPost> for NewPostRow {
    fn from(p: &NewPost) -> Self {
        Self {
            author_id: p.author_id.value(),
            kind: p.kind.as_str().to_string(),
            content: p.content.clone(),
            image_url: p.image_url.clone(),
        }
    }
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = post_comments)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct CommentRow {
    pub id: i64,
    pub post_id: i64,
    pub author_id: i64,
    pub content: String,
    pub deleted: bool,
    pub created_at: DateTime<Utc>,
}

impl From<CommentRow> for Comment {
    fn from(row: CommentRow) -> Self {
        Self {
            id: CommentId(row.id),
            post_id: PostId(row.post_id),
            author_id: UserId(row.author_id),
            content: row.content,
            deleted: row.deleted,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = post_comments)]
pub struct NewCommentRow {
    pub post_id: i64,
    pub author_id: i64,
    pub content: String,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = post_likes)]
pub struct NewPostLikeRow {
    pub post_id: i64,
    pub user_id: i64,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = comment_likes)]
pub struct NewCommentLikeRow {
    pub comment_id: i64,
    pub user_id: i64,
}

#[derive(Debug, QueryableByName)]
pub struct ServerTimeRow {
    #[diesel(sql_type = diesel::sql_types::Timestamptz)]
    pub now: DateTime<Utc>,
}

/// Partial post update; `None` fields are left untouched.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = posts)]
pub struct PostChangeset {
    pub content: Option<String>,
    pub image_url: Option<Option<String>>,
    pub updated_at: DateTime<Utc>,
}

impl From<PostChanges> for PostChangeset {
    fn from(changes: PostChanges) -> Self {
        Self {
            content: changes.content,
            image_url: changes.image_url,
            updated_at: Utc::now(),
        }
    }
}
