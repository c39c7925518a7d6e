//! HTTP handlers for the REST API.
//!
//! Each handler corresponds to an API endpoint and delegates to the
//! service layer for business logic.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::{Local, NaiveDate, NaiveDateTime};
use validator::Validate;

use super::auth::CurrentUser;
use super::dto::{
    ChangeEmailRequest, ChangePasswordRequest, CourtDateQuery, CreateCommentRequest,
    CreateCourtRequest, CreateHolidayRequest, CreatePostRequest, CreateReservationRequest,
    DateQuery, MessageResponse, OwnerProfileRequest, PageQuery, PlayerProfileRequest,
    RegisterRequest, UpdatePostRequest,
};
use super::error::AppError;
use super::state::AppState;
use crate::api::{
    AvailableSlots, BookedOnDate, CancelledReservation, CommentId, CommentView, Court,
    CourtBookingCheck, CourtId, HealthStatus, Holiday, LikeToggle, OccupiedSlots, OwnerProfile,
    Page, PlayerProfileView, PostId, PostView, RegisteredUser, Reservation, ReservationDetail,
    ReservationId, UserId, UserView,
};
use crate::db::repository::AccountRepository;
use crate::services::{accounts, courts, posts, profiles, reservations};

/// Result type for handlers.
pub type HandlerResult<T> = Result<Json<T>, AppError>;

type Created<T> = Result<(StatusCode, Json<T>), AppError>;

/// Local wall clock; slots are expressed in the facility's local time.
fn local_now() -> NaiveDateTime {
    Local::now().naive_local()
}

fn today() -> NaiveDate {
    local_now().date()
}

// =============================================================================
// Health Check
// =============================================================================

/// GET /health
pub async fn health_check(
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<HealthStatus>), AppError> {
    let healthy = match state.repository.health_check().await {
        Ok(ok) => ok,
        Err(e) => {
            tracing::warn!("Health check failed: {}", e);
            false
        }
    };
    let status = if healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    Ok((status, Json(HealthStatus::from_check(healthy))))
}

// =============================================================================
// Accounts
// =============================================================================

/// POST /v1/auth/register
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Created<RegisteredUser> {
    req.validate()?;
    let registered = accounts::register(
        state.repository.as_ref(),
        &req.name,
        &req.email,
        &req.password,
        req.role,
    )
    .await?;
    Ok((StatusCode::CREATED, Json(registered)))
}

/// GET /v1/account
pub async fn current_account(CurrentUser(user): CurrentUser) -> HandlerResult<UserView> {
    Ok(Json(UserView::from(&user)))
}

/// POST /v1/account/password
pub async fn change_password(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(req): Json<ChangePasswordRequest>,
) -> HandlerResult<MessageResponse> {
    req.validate()?;
    accounts::change_password(
        state.repository.as_ref(),
        &user,
        &req.current_password,
        &req.new_password,
        &req.confirm_password,
    )
    .await?;
    Ok(Json(MessageResponse::new("Password updated")))
}

/// POST /v1/account/email
pub async fn change_email(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(req): Json<ChangeEmailRequest>,
) -> HandlerResult<UserView> {
    req.validate()?;
    let view = accounts::change_email(
        state.repository.as_ref(),
        &user,
        &req.password,
        &req.new_email,
        &req.confirm_email,
    )
    .await?;
    Ok(Json(view))
}

// =============================================================================
// Profiles
// =============================================================================

/// PUT /v1/players/profile
pub async fn upsert_player_profile(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(req): Json<PlayerProfileRequest>,
) -> HandlerResult<PlayerProfileView> {
    req.validate()?;
    let view =
        profiles::upsert_player_profile(state.repository.as_ref(), &user, req.into(), today())
            .await?;
    Ok(Json(view))
}

/// GET /v1/players/profile
pub async fn own_player_profile(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> HandlerResult<PlayerProfileView> {
    let view = profiles::get_player_profile(state.repository.as_ref(), user.id, today()).await?;
    Ok(Json(view))
}

/// GET /v1/players/{user_id}/profile
pub async fn player_profile(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> HandlerResult<PlayerProfileView> {
    let view =
        profiles::get_player_profile(state.repository.as_ref(), UserId::new(user_id), today())
            .await?;
    Ok(Json(view))
}

/// PUT /v1/owners/profile
pub async fn upsert_owner_profile(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(req): Json<OwnerProfileRequest>,
) -> HandlerResult<OwnerProfile> {
    req.validate()?;
    let profile = profiles::upsert_owner_profile(
        state.repository.as_ref(),
        &user,
        &req.admin_name,
        &req.phone,
    )
    .await?;
    Ok(Json(profile))
}

/// GET /v1/owners/profile
pub async fn own_owner_profile(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> HandlerResult<OwnerProfile> {
    Ok(Json(
        profiles::get_owner_profile(state.repository.as_ref(), user.id).await?,
    ))
}

/// GET /v1/owners/{user_id}/profile
pub async fn owner_profile(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> HandlerResult<OwnerProfile> {
    Ok(Json(
        profiles::get_owner_profile(state.repository.as_ref(), UserId::new(user_id)).await?,
    ))
}

// =============================================================================
// Courts and holidays
// =============================================================================

/// GET /v1/owners/courts
pub async fn owner_courts(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> HandlerResult<Vec<Court>> {
    Ok(Json(
        courts::list_owner_courts(state.repository.as_ref(), user.id).await?,
    ))
}

/// POST /v1/courts
pub async fn create_court(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(req): Json<CreateCourtRequest>,
) -> Created<Court> {
    req.validate()?;
    let court = courts::create_court(
        state.repository.as_ref(),
        &user,
        req.into_new_court(user.id),
    )
    .await?;
    Ok((StatusCode::CREATED, Json(court)))
}

/// GET /v1/courts
pub async fn list_courts(State(state): State<AppState>) -> HandlerResult<Vec<Court>> {
    Ok(Json(courts::list_active_courts(state.repository.as_ref()).await?))
}

/// GET /v1/courts/{court_id}
pub async fn get_court(
    State(state): State<AppState>,
    Path(court_id): Path<i64>,
) -> HandlerResult<Court> {
    Ok(Json(
        courts::get_court(state.repository.as_ref(), CourtId::new(court_id)).await?,
    ))
}

/// GET /v1/courts/{court_id}/available-slots?date=YYYY-MM-DD
pub async fn available_slots(
    State(state): State<AppState>,
    Path(court_id): Path<i64>,
    Query(query): Query<DateQuery>,
) -> HandlerResult<AvailableSlots> {
    let date = query.required_date()?;
    let slots =
        courts::available_slots(state.repository.as_ref(), CourtId::new(court_id), date).await?;
    Ok(Json(slots))
}

/// POST /v1/holidays
pub async fn create_holiday(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(req): Json<CreateHolidayRequest>,
) -> Created<Holiday> {
    req.validate()?;
    let holiday = courts::create_holiday(
        state.repository.as_ref(),
        &user,
        req.date,
        &req.name,
        req.working_day,
    )
    .await?;
    Ok((StatusCode::CREATED, Json(holiday)))
}

/// GET /v1/holidays
pub async fn list_holidays(State(state): State<AppState>) -> HandlerResult<Vec<Holiday>> {
    Ok(Json(courts::list_holidays(state.repository.as_ref()).await?))
}

// =============================================================================
// Reservations
// =============================================================================

/// POST /v1/reservations
pub async fn create_reservation(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(req): Json<CreateReservationRequest>,
) -> Created<Reservation> {
    let reservation = reservations::create_reservation(
        state.repository.as_ref(),
        &user,
        req.court_id,
        req.date,
        req.start_time,
        local_now(),
    )
    .await?;
    Ok((StatusCode::CREATED, Json(reservation)))
}

/// GET /v1/reservations
pub async fn list_reservations(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> HandlerResult<Vec<ReservationDetail>> {
    let list =
        reservations::list_user_reservations(state.repository.as_ref(), &user, today()).await?;
    Ok(Json(list))
}

/// DELETE /v1/reservations/{reservation_id}
pub async fn cancel_reservation(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(reservation_id): Path<i64>,
) -> HandlerResult<CancelledReservation> {
    let cancelled = reservations::cancel_reservation(
        state.repository.as_ref(),
        &user,
        ReservationId::new(reservation_id),
        local_now(),
        &state.policy,
    )
    .await?;
    Ok(Json(cancelled))
}

/// GET /v1/reservations/occupied?court_id=&date=
pub async fn occupied_slots(
    State(state): State<AppState>,
    Query(query): Query<CourtDateQuery>,
) -> HandlerResult<OccupiedSlots> {
    let (court_id, date) = query.required()?;
    Ok(Json(
        reservations::occupied_slots(state.repository.as_ref(), court_id, date).await?,
    ))
}

/// GET /v1/reservations/booked?date=
pub async fn booked_on_date(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Query(query): Query<DateQuery>,
) -> HandlerResult<BookedOnDate> {
    let date = query.required_date()?;
    Ok(Json(
        reservations::has_reservation_on(state.repository.as_ref(), user.id, date).await?,
    ))
}

/// GET /v1/reservations/check?court_id=&date=
pub async fn check_court_booking(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Query(query): Query<CourtDateQuery>,
) -> HandlerResult<CourtBookingCheck> {
    let (court_id, date) = query.required()?;
    Ok(Json(
        reservations::has_reservation_at(state.repository.as_ref(), user.id, court_id, date)
            .await?,
    ))
}

// =============================================================================
// Posts
// =============================================================================

/// POST /v1/posts
pub async fn create_post(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(req): Json<CreatePostRequest>,
) -> Created<PostView> {
    req.validate()?;
    let view = posts::create_post(
        state.repository.as_ref(),
        &user,
        req.kind,
        &req.content,
        req.image_url,
    )
    .await?;
    Ok((StatusCode::CREATED, Json(view)))
}

/// GET /v1/posts?page=&per_page=
pub async fn list_posts(
    State(state): State<AppState>,
    Query(page): Query<PageQuery>,
) -> HandlerResult<Page<PostView>> {
    Ok(Json(
        posts::list_posts(state.repository.as_ref(), page.into()).await?,
    ))
}

/// GET /v1/posts/mine
pub async fn my_posts(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Query(page): Query<PageQuery>,
) -> HandlerResult<Page<PostView>> {
    Ok(Json(
        posts::list_user_posts(state.repository.as_ref(), &user, page.into()).await?,
    ))
}

/// GET /v1/posts/liked
pub async fn liked_posts(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Query(page): Query<PageQuery>,
) -> HandlerResult<Page<PostView>> {
    Ok(Json(
        posts::list_liked_posts(state.repository.as_ref(), &user, page.into()).await?,
    ))
}

/// GET /v1/posts/{post_id}
pub async fn get_post(
    State(state): State<AppState>,
    Path(post_id): Path<i64>,
) -> HandlerResult<PostView> {
    Ok(Json(
        posts::get_post(state.repository.as_ref(), PostId::new(post_id)).await?,
    ))
}

/// PUT /v1/posts/{post_id}
pub async fn update_post(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(post_id): Path<i64>,
    Json(req): Json<UpdatePostRequest>,
) -> HandlerResult<PostView> {
    req.validate()?;
    let view = posts::update_post(
        state.repository.as_ref(),
        &user,
        PostId::new(post_id),
        req.content,
        req.image_url,
    )
    .await?;
    Ok(Json(view))
}

/// DELETE /v1/posts/{post_id}
pub async fn delete_post(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(post_id): Path<i64>,
) -> HandlerResult<MessageResponse> {
    posts::delete_post(state.repository.as_ref(), &user, PostId::new(post_id)).await?;
    Ok(Json(MessageResponse::new("Post deleted")))
}

/// POST /v1/posts/{post_id}/comments
pub async fn add_comment(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(post_id): Path<i64>,
    Json(req): Json<CreateCommentRequest>,
) -> Created<CommentView> {
    req.validate()?;
    let comment =
        posts::add_comment(state.repository.as_ref(), &user, PostId::new(post_id), &req.content)
            .await?;
    Ok((StatusCode::CREATED, Json(comment)))
}

/// GET /v1/posts/{post_id}/comments
pub async fn list_comments(
    State(state): State<AppState>,
    Path(post_id): Path<i64>,
) -> HandlerResult<Vec<CommentView>> {
    Ok(Json(
        posts::list_comments(state.repository.as_ref(), PostId::new(post_id)).await?,
    ))
}

/// POST /v1/posts/{post_id}/like
pub async fn toggle_post_like(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(post_id): Path<i64>,
) -> HandlerResult<LikeToggle> {
    Ok(Json(
        posts::toggle_post_like(state.repository.as_ref(), &user, PostId::new(post_id)).await?,
    ))
}

/// POST /v1/comments/{comment_id}/like
pub async fn toggle_comment_like(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(comment_id): Path<i64>,
) -> HandlerResult<LikeToggle> {
    Ok(Json(
        posts::toggle_comment_like(
            state.repository.as_ref(),
            &user,
            CommentId::new(comment_id),
        )
        .await?,
    ))
}
