//! Slot availability.
//!
//! A court publishes weekly schedule ranges `[start, end)` split into slots of
//! `interval_minutes`. The slots offered on a date are the union over every
//! available range of the resolved day; a slot is bookable when it is offered
//! and no active reservation holds it.
//!
//! All arithmetic is done in minutes since midnight so ranges never wrap.

use std::collections::BTreeSet;

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime};

use crate::models::time::{minutes_since_midnight, time_from_minutes};
use crate::models::{CourtSchedule, DayOfWeek, Holiday};

/// Which weekday's schedule applies on `date`.
///
/// Non-working holidays follow the Sunday schedule.
pub fn resolve_schedule_day(date: NaiveDate, holiday: Option<&Holiday>) -> DayOfWeek {
    match holiday {
        Some(h) if !h.working_day => DayOfWeek::Sunday,
        _ => DayOfWeek::from(date.weekday()),
    }
}

/// Slot start times in `[start, end)` every `interval_minutes`.
pub fn generate_slots(start: NaiveTime, end: NaiveTime, interval_minutes: u32) -> Vec<NaiveTime> {
    if interval_minutes == 0 {
        return Vec::new();
    }

    let end = minutes_since_midnight(end);
    let mut current = minutes_since_midnight(start);
    let mut slots = Vec::new();

    while current < end {
        match time_from_minutes(current) {
            Some(t) => slots.push(t),
            None => break,
        }
        current = current.saturating_add(interval_minutes);
    }

    slots
}

/// Whether `time` is one of the slot starts of `schedule`.
pub fn slot_in_range(time: NaiveTime, schedule: &CourtSchedule) -> bool {
    if schedule.interval_minutes == 0 {
        return false;
    }

    let t = minutes_since_midnight(time);
    let start = minutes_since_midnight(schedule.start_time);
    let end = minutes_since_midnight(schedule.end_time);

    start <= t && t < end && (t - start) % schedule.interval_minutes == 0
}

fn ranges_for<'a>(
    schedules: &'a [CourtSchedule],
    day: DayOfWeek,
) -> impl Iterator<Item = &'a CourtSchedule> + 'a {
    schedules.iter().filter(move |s| s.available && s.day == day)
}

pub fn offered_slots(schedules: &[CourtSchedule], day: DayOfWeek) -> BTreeSet<NaiveTime> {
    ranges_for(schedules, day)
        .flat_map(|s| generate_slots(s.start_time, s.end_time, s.interval_minutes))
        .collect()
}

/// Offered slots minus `booked`, ascending.
pub fn available_slots(
    schedules: &[CourtSchedule],
    day: DayOfWeek,
    booked: &[NaiveTime],
) -> Vec<NaiveTime> {
    let booked: BTreeSet<NaiveTime> = booked.iter().copied().collect();
    offered_slots(schedules, day)
        .difference(&booked)
        .copied()
        .collect()
}

pub fn is_slot_offered(schedules: &[CourtSchedule], day: DayOfWeek, time: NaiveTime) -> bool {
    ranges_for(schedules, day).any(|s| slot_in_range(time, s))
}

/// A reservation starting at `start` may be cancelled at `now` only with at
/// least `notice` to spare.
pub fn can_cancel(start: NaiveDateTime, now: NaiveDateTime, notice: Duration) -> bool {
    start - now >= notice
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{HolidayId, ScheduleId};
    use proptest::prelude::*;

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn range(day: DayOfWeek, start: NaiveTime, end: NaiveTime, interval: u32) -> CourtSchedule {
        CourtSchedule {
            id: ScheduleId::new(1),
            day,
            start_time: start,
            end_time: end,
            interval_minutes: interval,
            available: true,
        }
    }

    #[test]
    fn test_generate_slots_excludes_end() {
        let slots = generate_slots(t(8, 0), t(11, 0), 60);
        assert_eq!(slots, vec![t(8, 0), t(9, 0), t(10, 0)]);
    }

    #[test]
    fn test_generate_slots_partial_last_interval() {
        let slots = generate_slots(t(8, 0), t(9, 45), 30);
        assert_eq!(slots, vec![t(8, 0), t(8, 30), t(9, 0), t(9, 30)]);
    }

    #[test]
    fn test_generate_slots_empty_and_inverted() {
        assert!(generate_slots(t(10, 0), t(10, 0), 60).is_empty());
        assert!(generate_slots(t(12, 0), t(10, 0), 60).is_empty());
        assert!(generate_slots(t(10, 0), t(12, 0), 0).is_empty());
    }

    #[test]
    fn test_generate_slots_runs_to_end_of_day() {
        let slots = generate_slots(t(22, 0), t(23, 59), 60);
        assert_eq!(slots, vec![t(22, 0), t(23, 0)]);
    }

    #[test]
    fn test_generate_slots_huge_interval_yields_start_only() {
        assert_eq!(generate_slots(t(8, 0), t(9, 0), u32::MAX), vec![t(8, 0)]);
        assert_eq!(generate_slots(t(23, 0), t(23, 59), u32::MAX - 1), vec![t(23, 0)]);
    }

    #[test]
    fn test_slot_in_range_alignment() {
        let s = range(DayOfWeek::Monday, t(8, 0), t(12, 0), 90);
        assert!(slot_in_range(t(8, 0), &s));
        assert!(slot_in_range(t(9, 30), &s));
        assert!(!slot_in_range(t(9, 0), &s));
        assert!(!slot_in_range(t(12, 0), &s));
        assert!(!slot_in_range(t(7, 0), &s));
    }

    #[test]
    fn test_holiday_uses_sunday_schedule() {
        // 2024-12-25 is a Wednesday.
        let date = NaiveDate::from_ymd_opt(2024, 12, 25).unwrap();
        let mut holiday = Holiday {
            id: HolidayId::new(1),
            date,
            name: "Navidad".into(),
            working_day: false,
        };
        assert_eq!(resolve_schedule_day(date, None), DayOfWeek::Wednesday);
        assert_eq!(resolve_schedule_day(date, Some(&holiday)), DayOfWeek::Sunday);

        holiday.working_day = true;
        assert_eq!(resolve_schedule_day(date, Some(&holiday)), DayOfWeek::Wednesday);
    }

    #[test]
    fn test_offered_slots_union_of_ranges() {
        let schedules = vec![
            range(DayOfWeek::Monday, t(8, 0), t(10, 0), 60),
            range(DayOfWeek::Monday, t(9, 0), t(11, 0), 60),
            range(DayOfWeek::Tuesday, t(18, 0), t(20, 0), 60),
            CourtSchedule {
                available: false,
                ..range(DayOfWeek::Monday, t(20, 0), t(22, 0), 60)
            },
        ];
        let offered: Vec<_> = offered_slots(&schedules, DayOfWeek::Monday)
            .into_iter()
            .collect();
        assert_eq!(offered, vec![t(8, 0), t(9, 0), t(10, 0)]);
        assert!(!is_slot_offered(&schedules, DayOfWeek::Monday, t(20, 0)));
        assert!(is_slot_offered(&schedules, DayOfWeek::Tuesday, t(19, 0)));
    }

    #[test]
    fn test_available_slots_removes_booked() {
        let schedules = vec![range(DayOfWeek::Friday, t(8, 0), t(12, 0), 60)];
        let free = available_slots(&schedules, DayOfWeek::Friday, &[t(9, 0), t(15, 0)]);
        assert_eq!(free, vec![t(8, 0), t(10, 0), t(11, 0)]);
    }

    #[test]
    fn test_can_cancel_boundary() {
        let start = NaiveDate::from_ymd_opt(2024, 6, 1)
            .unwrap()
            .and_time(t(18, 0));
        let notice = Duration::minutes(120);
        assert!(can_cancel(start, start - Duration::minutes(120), notice));
        assert!(!can_cancel(start, start - Duration::minutes(119), notice));
        assert!(!can_cancel(start, start + Duration::minutes(5), notice));
    }

    fn arb_schedule() -> impl Strategy<Value = CourtSchedule> {
        (0u32..1440, 0u32..1440, 1u32..=240, any::<bool>(), 0usize..7).prop_map(
            |(a, b, interval, available, day)| {
                let days = [
                    DayOfWeek::Monday,
                    DayOfWeek::Tuesday,
                    DayOfWeek::Wednesday,
                    DayOfWeek::Thursday,
                    DayOfWeek::Friday,
                    DayOfWeek::Saturday,
                    DayOfWeek::Sunday,
                ];
                let (lo, hi) = (a.min(b), a.max(b));
                CourtSchedule {
                    id: ScheduleId::new(1),
                    day: days[day],
                    start_time: time_from_minutes(lo).unwrap(),
                    end_time: time_from_minutes(hi).unwrap(),
                    interval_minutes: interval,
                    available,
                }
            },
        )
    }

    proptest! {
        #[test]
        fn prop_available_sorted_unique_and_free(
            schedules in prop::collection::vec(arb_schedule(), 0..6),
            booked_minutes in prop::collection::vec(0u32..1440, 0..20),
        ) {
            let booked: Vec<NaiveTime> = booked_minutes
                .iter()
                .filter_map(|m| time_from_minutes(*m))
                .collect();
            let free = available_slots(&schedules, DayOfWeek::Monday, &booked);

            for pair in free.windows(2) {
                prop_assert!(pair[0] < pair[1]);
            }
            for slot in &free {
                prop_assert!(!booked.contains(slot));
                prop_assert!(is_slot_offered(&schedules, DayOfWeek::Monday, *slot));
            }
        }

        #[test]
        fn prop_generated_slots_are_in_range(
            start in 0u32..1440,
            len in 0u32..1440,
            interval in 1u32..=1440,
        ) {
            let end = (start + len).min(1439);
            let s = CourtSchedule {
                id: ScheduleId::new(1),
                day: DayOfWeek::Monday,
                start_time: time_from_minutes(start).unwrap(),
                end_time: time_from_minutes(end).unwrap(),
                interval_minutes: interval,
                available: true,
            };
            for slot in generate_slots(s.start_time, s.end_time, interval) {
                prop_assert!(slot_in_range(slot, &s));
            }
        }
    }
}
