//! End-to-end booking rules over the in-memory repository.

mod support;

use chrono::Duration;
use liga_agil::db::repository::{CourtRepository, ReservationRepository};
use liga_agil::db::LocalRepository;
use liga_agil::models::{DayOfWeek, ReservationStatus, Role};
use liga_agil::services::{courts, reservations, BookingPolicy, ServiceError};

use support::{court_draft, create_user, future_monday, schedule, time};

#[tokio::test]
async fn test_booked_slot_disappears_and_returns_after_cancel() {
    let repo = LocalRepository::new();
    let owner = create_user(&repo, "owner@example.com", Role::Owner).await;
    let player = create_user(&repo, "player@example.com", Role::Player).await;
    let court = courts::create_court(
        &repo,
        &owner,
        court_draft(
            owner.id,
            vec![schedule(DayOfWeek::Monday, time(18, 0), time(21, 0), 60)],
        ),
    )
    .await
    .unwrap();

    let day = future_monday();
    let now = (day - Duration::days(2)).and_time(time(12, 0));

    let before = courts::available_slots(&repo, court.id, day).await.unwrap();
    assert_eq!(before.slots, vec!["18:00", "19:00", "20:00"]);

    let booking =
        reservations::create_reservation(&repo, &player, court.id, day, time(19, 0), now)
            .await
            .unwrap();

    let during = courts::available_slots(&repo, court.id, day).await.unwrap();
    assert_eq!(during.slots, vec!["18:00", "20:00"]);

    reservations::cancel_reservation(&repo, &player, booking.id, now, &BookingPolicy::default())
        .await
        .unwrap();

    let after = courts::available_slots(&repo, court.id, day).await.unwrap();
    assert_eq!(after.slots, before.slots);
    assert_eq!(
        repo.get_reservation(booking.id).await.unwrap().status,
        ReservationStatus::Cancelled
    );
}

#[tokio::test]
async fn test_concurrent_bookings_of_one_slot_yield_single_winner() {
    let repo = std::sync::Arc::new(LocalRepository::new());
    let owner = create_user(&repo, "owner@example.com", Role::Owner).await;
    let court = repo
        .create_court(court_draft(
            owner.id,
            vec![schedule(DayOfWeek::Monday, time(8, 0), time(9, 0), 60)],
        ))
        .await
        .unwrap();

    let mut players = Vec::new();
    for i in 0..8 {
        players.push(create_user(&repo, &format!("p{}@example.com", i), Role::Player).await);
    }

    let day = future_monday();
    let now = (day - Duration::days(1)).and_time(time(8, 0));
    let mut handles = Vec::new();
    for player in players {
        let repo = repo.clone();
        let court_id = court.id;
        handles.push(tokio::spawn(async move {
            reservations::create_reservation(repo.as_ref(), &player, court_id, day, time(8, 0), now)
                .await
        }));
    }

    let mut won = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => won += 1,
            Err(ServiceError::Conflict(_)) => {}
            Err(other) => panic!("unexpected error: {other}"),
        }
    }
    assert_eq!(won, 1);
    assert_eq!(
        repo.list_active_reservations(court.id, day)
            .await
            .unwrap()
            .len(),
        1
    );
}

#[tokio::test]
async fn test_custom_notice_policy() {
    let repo = LocalRepository::new();
    let owner = create_user(&repo, "owner@example.com", Role::Owner).await;
    let court = repo
        .create_court(court_draft(
            owner.id,
            vec![schedule(DayOfWeek::Monday, time(10, 0), time(12, 0), 30)],
        ))
        .await
        .unwrap();

    let day = future_monday();
    let booked_at = (day - Duration::days(1)).and_time(time(10, 0));
    let r = reservations::create_reservation(&repo, &owner, court.id, day, time(11, 30), booked_at)
        .await
        .unwrap();

    // 45 minutes before start: fine with a 30 minute policy, too late with 60.
    let now = day.and_time(time(10, 45));
    let strict = BookingPolicy::with_notice_minutes(60);
    assert!(matches!(
        reservations::cancel_reservation(&repo, &owner, r.id, now, &strict).await,
        Err(ServiceError::Validation(_))
    ));
    let lenient = BookingPolicy::with_notice_minutes(30);
    reservations::cancel_reservation(&repo, &owner, r.id, now, &lenient)
        .await
        .unwrap();
}
