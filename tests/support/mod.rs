#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::Mutex;

use chrono::{NaiveDate, NaiveTime};
use liga_agil::db::repository::AccountRepository;
use liga_agil::db::LocalRepository;
use liga_agil::models::{
    CourtStatus, DayOfWeek, NewCourt, NewCourtSchedule, NewUser, Role, User, UserId,
};

static ENV_LOCK: Mutex<()> = Mutex::new(());

/// Runs `f` with environment variables temporarily modified.
///
/// Restores the previous values on drop (including unwinds) and serializes
/// access to the process environment across parallel tests.
///
/// `changes` is a list of `(key, value)` pairs:
/// - `Some(v)` sets the variable to `v`
/// - `None` removes the variable
pub fn with_scoped_env<F, R>(changes: &[(&str, Option<&str>)], f: F) -> R
where
    F: FnOnce() -> R,
{
    let _lock = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
    let _guard = ScopedEnv::new(changes);
    f()
}

struct ScopedEnv {
    snapshot: Vec<(String, Option<String>)>,
}

impl ScopedEnv {
    fn new(changes: &[(&str, Option<&str>)]) -> Self {
        let keys: HashSet<&str> = changes.iter().map(|(k, _)| *k).collect();
        let snapshot = keys
            .into_iter()
            .map(|k| (k.to_string(), std::env::var(k).ok()))
            .collect::<Vec<_>>();

        for (k, v) in changes {
            match v {
                Some(val) => std::env::set_var(k, val),
                None => std::env::remove_var(k),
            }
        }

        Self { snapshot }
    }
}

impl Drop for ScopedEnv {
    fn drop(&mut self) {
        for (k, v) in self.snapshot.drain(..) {
            match v {
                Some(val) => std::env::set_var(&k, val),
                None => std::env::remove_var(&k),
            }
        }
    }
}

// =============================================================================
// Fixtures
// =============================================================================

pub fn time(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap()
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// A Monday far enough ahead that "now" never catches up with it.
pub fn future_monday() -> NaiveDate {
    date(2035, 6, 4)
}

pub async fn create_user(repo: &LocalRepository, email: &str, role: Role) -> User {
    repo.create_user(NewUser {
        name: email.split('@').next().unwrap_or("user").to_string(),
        email: email.to_string(),
        password_hash: "unused".to_string(),
        role,
        terms_accepted: true,
    })
    .await
    .unwrap()
}

pub fn schedule(
    day: DayOfWeek,
    start: NaiveTime,
    end: NaiveTime,
    interval: u32,
) -> NewCourtSchedule {
    NewCourtSchedule {
        day,
        start_time: start,
        end_time: end,
        interval_minutes: interval,
        available: true,
    }
}

pub fn court_draft(owner_id: UserId, schedules: Vec<NewCourtSchedule>) -> NewCourt {
    NewCourt {
        owner_id,
        name: "Cancha Central".to_string(),
        sport: "futbol".to_string(),
        subtype: "futbol 7".to_string(),
        address: "Av. Principal 123".to_string(),
        latitude: -12.05,
        longitude: -77.04,
        full_address: "Av. Principal 123, Lima".to_string(),
        surface: "sintetico".to_string(),
        capacity: 14,
        price_per_hour: 80.0,
        description: "Iluminada".to_string(),
        status: CourtStatus::Active,
        image_urls: vec!["https://img.example/1.webp".to_string()],
        schedules,
        rules: vec!["Sin tacos de metal".to_string()],
        amenities: vec!["Vestuarios".to_string()],
    }
}
