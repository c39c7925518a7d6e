//! Court catalogue, holidays and per-date availability.

use chrono::NaiveDate;

use super::availability;
use super::{ServiceError, ServiceResult};
use crate::api::AvailableSlots;
use crate::db::repository::{CourtRepository, FullRepository, ReservationRepository};
use crate::models::time::{format_slot, MINUTES_PER_DAY};
use crate::models::{Court, CourtId, Holiday, NewCourt, NewHoliday, User, UserId};

pub const DEFAULT_SLOT_INTERVAL_MINUTES: u32 = 60;

fn require_owner(user: &User, action: &str) -> ServiceResult<()> {
    if !user.is_owner() {
        return Err(ServiceError::forbidden(format!("Only owners can {}", action)));
    }
    Ok(())
}

fn non_empty(value: &mut String, field: &str) -> ServiceResult<()> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ServiceError::validation(format!("{} is required", field)));
    }
    *value = trimmed.to_string();
    Ok(())
}

/// Field and schedule checks for a court about to be stored.
fn validate_new_court(court: &mut NewCourt) -> ServiceResult<()> {
    non_empty(&mut court.name, "name")?;
    non_empty(&mut court.sport, "sport")?;
    non_empty(&mut court.subtype, "subtype")?;
    non_empty(&mut court.address, "address")?;
    non_empty(&mut court.full_address, "full_address")?;
    non_empty(&mut court.surface, "surface")?;

    if !(-90.0..=90.0).contains(&court.latitude) {
        return Err(ServiceError::validation("latitude must be within [-90, 90]"));
    }
    if !(-180.0..=180.0).contains(&court.longitude) {
        return Err(ServiceError::validation(
            "longitude must be within [-180, 180]",
        ));
    }
    if court.capacity <= 0 {
        return Err(ServiceError::validation("capacity must be positive"));
    }
    if !court.price_per_hour.is_finite() || court.price_per_hour < 0.0 {
        return Err(ServiceError::validation("price_per_hour cannot be negative"));
    }

    for (i, s) in court.schedules.iter().enumerate() {
        if s.start_time >= s.end_time {
            return Err(ServiceError::validation(format!(
                "schedule {} ({}): start_time must be before end_time",
                i, s.day
            )));
        }
        if s.interval_minutes == 0 || s.interval_minutes > MINUTES_PER_DAY {
            return Err(ServiceError::validation(format!(
                "schedule {} ({}): interval_minutes must be between 1 and {}",
                i, s.day, MINUTES_PER_DAY
            )));
        }
    }

    court.image_urls = court
        .image_urls
        .drain(..)
        .map(|u| u.trim().to_string())
        .filter(|u| !u.is_empty())
        .collect();
    court.rules.retain(|r| !r.trim().is_empty());
    court.amenities.retain(|a| !a.trim().is_empty());

    Ok(())
}

pub async fn create_court<R: CourtRepository + ?Sized>(
    repo: &R,
    owner: &User,
    mut court: NewCourt,
) -> ServiceResult<Court> {
    require_owner(owner, "publish courts")?;
    court.owner_id = owner.id;
    validate_new_court(&mut court)?;

    let created = repo.create_court(court).await?;
    log::info!(
        "Owner {} published court {} ({})",
        owner.id,
        created.id,
        created.name
    );
    Ok(created)
}

pub async fn get_court<R: CourtRepository + ?Sized>(
    repo: &R,
    court_id: CourtId,
) -> ServiceResult<Court> {
    Ok(repo.get_court(court_id).await?)
}

pub async fn list_active_courts<R: CourtRepository + ?Sized>(
    repo: &R,
) -> ServiceResult<Vec<Court>> {
    Ok(repo.list_active_courts().await?)
}

pub async fn list_owner_courts<R: CourtRepository + ?Sized>(
    repo: &R,
    owner_id: UserId,
) -> ServiceResult<Vec<Court>> {
    Ok(repo.list_courts_by_owner(owner_id).await?)
}

pub async fn create_holiday<R: CourtRepository + ?Sized>(
    repo: &R,
    owner: &User,
    date: NaiveDate,
    name: &str,
    working_day: bool,
) -> ServiceResult<Holiday> {
    require_owner(owner, "declare holidays")?;
    let mut name = name.to_string();
    non_empty(&mut name, "name")?;

    if repo.get_holiday(date).await?.is_some() {
        return Err(ServiceError::conflict(format!(
            "A holiday already exists on {}",
            date
        )));
    }

    Ok(repo
        .create_holiday(NewHoliday {
            date,
            name,
            working_day,
        })
        .await?)
}

pub async fn list_holidays<R: CourtRepository + ?Sized>(repo: &R) -> ServiceResult<Vec<Holiday>> {
    Ok(repo.list_holidays().await?)
}

/// Free slots of `court_id` on `date`.
pub async fn available_slots<R: FullRepository + ?Sized>(
    repo: &R,
    court_id: CourtId,
    date: NaiveDate,
) -> ServiceResult<AvailableSlots> {
    let court = repo.get_court(court_id).await?;
    let holiday = repo.get_holiday(date).await?;
    let day = availability::resolve_schedule_day(date, holiday.as_ref());

    let booked: Vec<_> = repo
        .list_active_reservations(court_id, date)
        .await?
        .into_iter()
        .map(|r| r.start_time)
        .collect();

    let slots = availability::available_slots(&court.schedules, day, &booked)
        .into_iter()
        .map(format_slot)
        .collect();

    Ok(AvailableSlots {
        court_id,
        date,
        day,
        holiday: holiday.map(|h| h.name),
        slots,
    })
}
