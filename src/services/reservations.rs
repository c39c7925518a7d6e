//! Booking rules: create, list, cancel and occupancy queries.

use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use super::availability;
use super::{BookingPolicy, ServiceError, ServiceResult};
use crate::db::repository::{CourtRepository, FullRepository, ReservationRepository};
use crate::models::time::{format_slot, truncate_to_minute};
use crate::models::{
    CourtId, CourtStatus, CourtSummary, NewReservation, Reservation, ReservationDetail,
    ReservationId, ReservationStatus, User, UserId,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OccupiedSlots {
    pub court_id: CourtId,
    pub date: NaiveDate,
    pub slots: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookedOnDate {
    pub reserved: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourtBookingCheck {
    pub has_reservation: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CancelledReservation {
    #[serde(flatten)]
    pub reservation: Reservation,
    pub cancelled_at: DateTime<Utc>,
}

/// Book `time` on `court_id` for `date` as of `now` (local wall clock).
///
/// Checks run in a fixed order so the first failing rule decides the error:
/// one booking per user per day, court exists and is active, start not in the
/// past, slot offered by the schedule, slot still free.
pub async fn create_reservation<R: FullRepository + ?Sized>(
    repo: &R,
    user: &User,
    court_id: CourtId,
    date: NaiveDate,
    time: NaiveTime,
    now: NaiveDateTime,
) -> ServiceResult<Reservation> {
    let time = truncate_to_minute(time);

    if repo.user_has_active_reservation(user.id, date, None).await? {
        log::info!("User {} already has a booking on {}", user.id, date);
        return Err(ServiceError::validation(format!(
            "You already have a reservation on {}",
            date
        )));
    }

    let court = repo.get_court(court_id).await?;
    if court.status != CourtStatus::Active {
        return Err(ServiceError::validation(format!(
            "Court {} is not accepting reservations ({})",
            court_id, court.status
        )));
    }

    if date.and_time(time) < now {
        return Err(ServiceError::validation(
            "Cannot book a slot in the past",
        ));
    }

    let holiday = repo.get_holiday(date).await?;
    let day = availability::resolve_schedule_day(date, holiday.as_ref());
    if !availability::is_slot_offered(&court.schedules, day, time) {
        return Err(ServiceError::validation(format!(
            "{} is not an offered slot on {} ({})",
            format_slot(time),
            date,
            day
        )));
    }

    let taken = repo
        .list_active_reservations(court_id, date)
        .await?
        .iter()
        .any(|r| r.start_time == time);
    if taken {
        return Err(ServiceError::conflict(format!(
            "Slot {} on {} is already booked",
            format_slot(time),
            date
        )));
    }

    let reservation = repo
        .create_reservation(NewReservation {
            court_id,
            user_id: user.id,
            date,
            start_time: time,
            status: ReservationStatus::Confirmed,
        })
        .await?;

    log::info!(
        "Reservation {} created: court {} on {} at {} for user {}",
        reservation.id,
        court_id,
        date,
        format_slot(time),
        user.id
    );
    Ok(reservation)
}

/// All reservations of `user`, newest first, each with its court summary.
///
/// Confirmed reservations dated before `today` are stored as finished first.
pub async fn list_user_reservations<R: FullRepository + ?Sized>(
    repo: &R,
    user: &User,
    today: NaiveDate,
) -> ServiceResult<Vec<ReservationDetail>> {
    let finished = repo.finish_past_reservations(user.id, today).await?;
    if finished > 0 {
        log::debug!("Marked {} reservations of user {} as finished", finished, user.id);
    }

    let reservations = repo.list_reservations_for_user(user.id).await?;
    let mut courts: HashMap<CourtId, Option<CourtSummary>> = HashMap::new();
    let mut details = Vec::with_capacity(reservations.len());

    for reservation in reservations {
        let court = match courts.get(&reservation.court_id) {
            Some(cached) => cached.clone(),
            None => {
                let summary = match repo.get_court(reservation.court_id).await {
                    Ok(court) => Some(court.summary()),
                    Err(e) if e.is_not_found() => None,
                    Err(e) => return Err(e.into()),
                };
                courts.insert(reservation.court_id, summary.clone());
                summary
            }
        };
        details.push(ReservationDetail { reservation, court });
    }

    Ok(details)
}

pub async fn cancel_reservation<R: ReservationRepository + ?Sized>(
    repo: &R,
    user: &User,
    reservation_id: ReservationId,
    now: NaiveDateTime,
    policy: &BookingPolicy,
) -> ServiceResult<CancelledReservation> {
    let reservation = repo.get_reservation(reservation_id).await?;

    if reservation.user_id != user.id {
        return Err(ServiceError::forbidden(
            "You can only cancel your own reservations",
        ));
    }
    match reservation.status {
        ReservationStatus::Cancelled => {
            return Err(ServiceError::validation("Reservation is already cancelled"))
        }
        ReservationStatus::Finished => {
            return Err(ServiceError::validation("Reservation has already finished"))
        }
        ReservationStatus::Pending | ReservationStatus::Confirmed => {}
    }
    if !availability::can_cancel(reservation.starts_at(), now, policy.min_cancellation_notice) {
        return Err(ServiceError::validation(format!(
            "Reservations can only be cancelled at least {} minutes in advance",
            policy.notice_minutes()
        )));
    }

    let cancelled = repo
        .update_reservation_status(reservation_id, ReservationStatus::Cancelled)
        .await?;
    log::info!("Reservation {} cancelled by user {}", reservation_id, user.id);

    Ok(CancelledReservation {
        cancelled_at: cancelled.updated_at,
        reservation: cancelled,
    })
}

/// Start times held by active reservations, ascending.
pub async fn occupied_slots<R: FullRepository + ?Sized>(
    repo: &R,
    court_id: CourtId,
    date: NaiveDate,
) -> ServiceResult<OccupiedSlots> {
    repo.get_court(court_id).await?;
    let slots = repo
        .list_active_reservations(court_id, date)
        .await?
        .into_iter()
        .map(|r| format_slot(r.start_time))
        .collect();
    Ok(OccupiedSlots {
        court_id,
        date,
        slots,
    })
}

pub async fn has_reservation_on<R: ReservationRepository + ?Sized>(
    repo: &R,
    user_id: UserId,
    date: NaiveDate,
) -> ServiceResult<BookedOnDate> {
    Ok(BookedOnDate {
        reserved: repo.user_has_active_reservation(user_id, date, None).await?,
    })
}

pub async fn has_reservation_at<R: ReservationRepository + ?Sized>(
    repo: &R,
    user_id: UserId,
    court_id: CourtId,
    date: NaiveDate,
) -> ServiceResult<CourtBookingCheck> {
    Ok(CourtBookingCheck {
        has_reservation: repo
            .user_has_active_reservation(user_id, date, Some(court_id))
            .await?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::AccountRepository;
    use crate::db::LocalRepository;
    use crate::models::{Court, DayOfWeek, NewCourt, NewCourtSchedule, NewHoliday, NewUser, Role};
    use chrono::Duration;

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    // Monday.
    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2030, 6, 3).unwrap()
    }

    fn morning_before() -> NaiveDateTime {
        (day() - Duration::days(1)).and_time(t(9, 0))
    }

    async fn user(repo: &LocalRepository, email: &str, role: Role) -> User {
        repo.create_user(NewUser {
            name: email.into(),
            email: email.into(),
            password_hash: "x".into(),
            role,
            terms_accepted: true,
        })
        .await
        .unwrap()
    }

    async fn court(repo: &LocalRepository, owner: UserId, status: CourtStatus) -> Court {
        repo.create_court(NewCourt {
            owner_id: owner,
            name: "Cancha".into(),
            sport: "padel".into(),
            subtype: "dobles".into(),
            address: "Av 1".into(),
            latitude: 0.0,
            longitude: 0.0,
            full_address: "Av 1".into(),
            surface: "cesped".into(),
            capacity: 4,
            price_per_hour: 10.0,
            description: String::new(),
            status,
            image_urls: vec![],
            schedules: vec![NewCourtSchedule {
                day: DayOfWeek::Monday,
                start_time: t(8, 0),
                end_time: t(12, 0),
                interval_minutes: 60,
                available: true,
            }],
            rules: vec![],
            amenities: vec![],
        })
        .await
        .unwrap()
    }

    async fn setup() -> (LocalRepository, User, User, Court) {
        let repo = LocalRepository::new();
        let owner = user(&repo, "owner@example.com", Role::Owner).await;
        let player = user(&repo, "player@example.com", Role::Player).await;
        let court = court(&repo, owner.id, CourtStatus::Active).await;
        (repo, owner, player, court)
    }

    #[tokio::test]
    async fn test_booking_truncates_seconds_and_confirms() {
        let (repo, _, player, court) = setup().await;
        let r = create_reservation(
            &repo,
            &player,
            court.id,
            day(),
            NaiveTime::from_hms_opt(9, 0, 42).unwrap(),
            morning_before(),
        )
        .await
        .unwrap();
        assert_eq!(r.start_time, t(9, 0));
        assert_eq!(r.status, ReservationStatus::Confirmed);
    }

    #[tokio::test]
    async fn test_one_booking_per_user_per_day() {
        let (repo, _, player, court) = setup().await;
        create_reservation(&repo, &player, court.id, day(), t(8, 0), morning_before())
            .await
            .unwrap();
        let err = create_reservation(&repo, &player, court.id, day(), t(10, 0), morning_before())
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
    }

    #[tokio::test]
    async fn test_taken_slot_conflicts() {
        let (repo, owner, player, court) = setup().await;
        create_reservation(&repo, &owner, court.id, day(), t(8, 0), morning_before())
            .await
            .unwrap();
        let err = create_reservation(&repo, &player, court.id, day(), t(8, 0), morning_before())
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_rejects_unoffered_past_and_inactive() {
        let (repo, owner, player, court) = setup().await;

        let off_grid =
            create_reservation(&repo, &player, court.id, day(), t(8, 30), morning_before()).await;
        assert!(matches!(off_grid, Err(ServiceError::Validation(_))));

        let past = create_reservation(
            &repo,
            &player,
            court.id,
            day(),
            t(8, 0),
            day().and_time(t(8, 1)),
        )
        .await;
        assert!(matches!(past, Err(ServiceError::Validation(_))));

        let closed = court_with_status(&repo, owner.id, CourtStatus::Maintenance).await;
        let inactive =
            create_reservation(&repo, &player, closed, day(), t(8, 0), morning_before()).await;
        assert!(matches!(inactive, Err(ServiceError::Validation(_))));

        let missing = create_reservation(
            &repo,
            &player,
            CourtId::new(999),
            day(),
            t(8, 0),
            morning_before(),
        )
        .await;
        assert!(matches!(missing, Err(ServiceError::NotFound(_))));
    }

    async fn court_with_status(
        repo: &LocalRepository,
        owner: UserId,
        status: CourtStatus,
    ) -> CourtId {
        court(repo, owner, status).await.id
    }

    #[tokio::test]
    async fn test_cancel_rules() {
        let (repo, owner, player, court) = setup().await;
        let policy = BookingPolicy::default();
        let r = create_reservation(&repo, &player, court.id, day(), t(10, 0), morning_before())
            .await
            .unwrap();

        let stranger = cancel_reservation(&repo, &owner, r.id, morning_before(), &policy).await;
        assert!(matches!(stranger, Err(ServiceError::Forbidden(_))));

        let late = day().and_time(t(8, 30));
        let too_late = cancel_reservation(&repo, &player, r.id, late, &policy).await;
        assert!(matches!(too_late, Err(ServiceError::Validation(_))));

        let on_time = day().and_time(t(8, 0));
        let cancelled = cancel_reservation(&repo, &player, r.id, on_time, &policy)
            .await
            .unwrap();
        assert_eq!(cancelled.reservation.status, ReservationStatus::Cancelled);

        let again = cancel_reservation(&repo, &player, r.id, on_time, &policy).await;
        assert!(matches!(again, Err(ServiceError::Validation(_))));

        // The freed slot can be booked again.
        create_reservation(&repo, &owner, court.id, day(), t(10, 0), morning_before())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_holiday_bookings_follow_resolved_schedule() {
        let (repo, owner, player, _) = setup().await;
        let weekend = repo
            .create_court(NewCourt {
                owner_id: owner.id,
                name: "Cancha Festiva".into(),
                sport: "padel".into(),
                subtype: "dobles".into(),
                address: "Av 2".into(),
                latitude: 0.0,
                longitude: 0.0,
                full_address: "Av 2".into(),
                surface: "cesped".into(),
                capacity: 4,
                price_per_hour: 10.0,
                description: String::new(),
                status: CourtStatus::Active,
                image_urls: vec![],
                schedules: vec![
                    NewCourtSchedule {
                        day: DayOfWeek::Monday,
                        start_time: t(8, 0),
                        end_time: t(12, 0),
                        interval_minutes: 60,
                        available: true,
                    },
                    NewCourtSchedule {
                        day: DayOfWeek::Sunday,
                        start_time: t(16, 0),
                        end_time: t(18, 0),
                        interval_minutes: 60,
                        available: true,
                    },
                ],
                rules: vec![],
                amenities: vec![],
            })
            .await
            .unwrap();

        // day() is a Monday closed for a holiday; the next Monday is a working one.
        repo.create_holiday(NewHoliday {
            date: day(),
            name: "Dia del Trabajo".into(),
            working_day: false,
        })
        .await
        .unwrap();
        let working_monday = day() + Duration::days(7);
        repo.create_holiday(NewHoliday {
            date: working_monday,
            name: "Feriado puente".into(),
            working_day: true,
        })
        .await
        .unwrap();

        let weekday_slot =
            create_reservation(&repo, &player, weekend.id, day(), t(9, 0), morning_before()).await;
        assert!(matches!(weekday_slot, Err(ServiceError::Validation(_))));

        let sunday_slot =
            create_reservation(&repo, &player, weekend.id, day(), t(16, 0), morning_before())
                .await
                .unwrap();
        assert_eq!(sunday_slot.start_time, t(16, 0));

        let sunday_on_working = create_reservation(
            &repo,
            &owner,
            weekend.id,
            working_monday,
            t(16, 0),
            morning_before(),
        )
        .await;
        assert!(matches!(sunday_on_working, Err(ServiceError::Validation(_))));

        let monday_on_working = create_reservation(
            &repo,
            &owner,
            weekend.id,
            working_monday,
            t(9, 0),
            morning_before(),
        )
        .await
        .unwrap();
        assert_eq!(monday_on_working.date, working_monday);
    }

    #[tokio::test]
    async fn test_listing_finishes_past_confirmed() {
        let (repo, _, player, court) = setup().await;
        create_reservation(&repo, &player, court.id, day(), t(9, 0), morning_before())
            .await
            .unwrap();

        let listed = list_user_reservations(&repo, &player, day()).await.unwrap();
        assert_eq!(listed[0].reservation.status, ReservationStatus::Confirmed);
        assert_eq!(listed[0].court.as_ref().map(|c| c.id), Some(court.id));

        let later = day() + Duration::days(1);
        let listed = list_user_reservations(&repo, &player, later).await.unwrap();
        assert_eq!(listed[0].reservation.status, ReservationStatus::Finished);
        assert!(!has_reservation_on(&repo, player.id, day()).await.unwrap().reserved);
    }

    #[tokio::test]
    async fn test_occupancy_queries() {
        let (repo, owner, player, court) = setup().await;
        create_reservation(&repo, &player, court.id, day(), t(11, 0), morning_before())
            .await
            .unwrap();
        create_reservation(&repo, &owner, court.id, day(), t(8, 0), morning_before())
            .await
            .unwrap();

        let occupied = occupied_slots(&repo, court.id, day()).await.unwrap();
        assert_eq!(occupied.slots, vec!["08:00", "11:00"]);

        assert!(has_reservation_on(&repo, player.id, day()).await.unwrap().reserved);
        assert!(
            has_reservation_at(&repo, player.id, court.id, day())
                .await
                .unwrap()
                .has_reservation
        );
        assert!(
            !has_reservation_at(&repo, player.id, CourtId::new(77), day())
                .await
                .unwrap()
                .has_reservation
        );
    }
}
