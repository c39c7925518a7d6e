//! Behaviour of the in-memory repository through the repository traits.

mod support;

use liga_agil::db::repository::{
    AccountRepository, CourtRepository, PostRepository, ReservationRepository,
};
use liga_agil::db::LocalRepository;
use liga_agil::models::{
    DayOfWeek, NewHoliday, NewPost, NewReservation, PageRequest, PostChanges, PostKind,
    ReservationStatus, Role,
};

use support::{court_draft, create_user, date, schedule, time};

#[tokio::test]
async fn test_unhealthy_repository_rejects_writes() {
    let repo = LocalRepository::new();
    repo.set_healthy(false);
    assert!(!repo.health_check().await.unwrap());

    let err = repo
        .create_holiday(NewHoliday {
            date: date(2030, 1, 1),
            name: "Año Nuevo".into(),
            working_day: false,
        })
        .await
        .unwrap_err();
    assert!(err.is_retryable());

    repo.set_healthy(true);
    assert!(repo.health_check().await.unwrap());
}

#[tokio::test]
async fn test_court_children_and_listing_order() {
    let repo = LocalRepository::new();
    let owner = create_user(&repo, "owner@example.com", Role::Owner).await;

    let first = repo
        .create_court(court_draft(
            owner.id,
            vec![
                schedule(DayOfWeek::Monday, time(8, 0), time(10, 0), 60),
                schedule(DayOfWeek::Sunday, time(9, 0), time(13, 0), 120),
            ],
        ))
        .await
        .unwrap();
    let second = repo
        .create_court(court_draft(owner.id, vec![]))
        .await
        .unwrap();

    let fetched = repo.get_court(first.id).await.unwrap();
    assert_eq!(fetched.schedules.len(), 2);
    assert_eq!(fetched.images[0].position, 0);
    assert_eq!(fetched.rules, vec!["Sin tacos de metal"]);

    let active = repo.list_active_courts().await.unwrap();
    assert_eq!(active[0].id, second.id);
    assert_eq!(repo.list_courts_by_owner(owner.id).await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_holidays_sorted_by_date_and_unique() {
    let repo = LocalRepository::new();
    for (d, name) in [(date(2030, 12, 25), "Navidad"), (date(2030, 5, 1), "Trabajo")] {
        repo.create_holiday(NewHoliday {
            date: d,
            name: name.into(),
            working_day: false,
        })
        .await
        .unwrap();
    }
    let names: Vec<_> = repo
        .list_holidays()
        .await
        .unwrap()
        .into_iter()
        .map(|h| h.name)
        .collect();
    assert_eq!(names, vec!["Trabajo", "Navidad"]);

    let dup = repo
        .create_holiday(NewHoliday {
            date: date(2030, 5, 1),
            name: "Otro".into(),
            working_day: true,
        })
        .await
        .unwrap_err();
    assert!(dup.is_conflict());
}

#[tokio::test]
async fn test_reservation_listing_newest_first() {
    let repo = LocalRepository::new();
    let owner = create_user(&repo, "owner@example.com", Role::Owner).await;
    let court = repo.create_court(court_draft(owner.id, vec![])).await.unwrap();

    for (d, t) in [
        (date(2030, 1, 7), time(9, 0)),
        (date(2030, 1, 9), time(8, 0)),
        (date(2030, 1, 7), time(18, 0)),
    ] {
        repo.create_reservation(NewReservation {
            court_id: court.id,
            user_id: owner.id,
            date: d,
            start_time: t,
            status: ReservationStatus::Confirmed,
        })
        .await
        .unwrap();
    }

    let listed: Vec<_> = repo
        .list_reservations_for_user(owner.id)
        .await
        .unwrap()
        .into_iter()
        .map(|r| (r.date, r.start_time))
        .collect();
    assert_eq!(
        listed,
        vec![
            (date(2030, 1, 9), time(8, 0)),
            (date(2030, 1, 7), time(18, 0)),
            (date(2030, 1, 7), time(9, 0)),
        ]
    );

    assert!(repo
        .user_has_active_reservation(owner.id, date(2030, 1, 7), Some(court.id))
        .await
        .unwrap());
}

#[tokio::test]
async fn test_post_pagination_and_updates() {
    let repo = LocalRepository::new();
    let author = create_user(&repo, "ana@example.com", Role::Player).await;

    for i in 0..25 {
        repo.create_post(NewPost {
            author_id: author.id,
            kind: PostKind::Text,
            content: format!("post {}", i),
            image_url: None,
        })
        .await
        .unwrap();
    }

    let page = repo.list_posts(PageRequest::new(Some(3), Some(10))).await.unwrap();
    assert_eq!(page.items.len(), 5);
    assert_eq!(page.pagination.total, 25);
    assert_eq!(page.pagination.total_pages, 3);
    assert_eq!(page.items[0].post.content, "post 4");

    let newest = repo.list_posts(PageRequest::default()).await.unwrap();
    let id = newest.items[0].post.id;
    assert_eq!(newest.items[0].post.content, "post 24");

    let updated = repo
        .update_post(
            id,
            PostChanges {
                content: None,
                image_url: Some(Some("x.webp".into())),
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.content, "post 24");
    assert_eq!(updated.image_url.as_deref(), Some("x.webp"));
}
