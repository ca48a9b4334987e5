use std::collections::HashSet;
use std::sync::Arc;

use chrono::{Duration, NaiveDate, NaiveTime};
use tracing::debug;
use uuid::Uuid;

use shared_store::ClinicStore;

use crate::models::{Slot, WorkSchedule, SLOT_MINUTES};

/// Derives the bookable slots for a doctor from their work schedule.
/// Slots are computed on demand and never stored.
pub struct SlotCalendarService {
    store: Arc<ClinicStore>,
}

impl SlotCalendarService {
    pub fn new(store: Arc<ClinicStore>) -> Self {
        Self { store }
    }

    /// List the free, 30-minute-aligned slots for a doctor over an
    /// inclusive date range.
    ///
    /// Available schedule windows intersecting each date are clipped to
    /// that date, union-merged, subdivided on the slot grid, and any slot
    /// held by a non-cancelled booking is subtracted. Unknown doctors and
    /// empty or inverted ranges yield an empty list, never an error.
    pub async fn list_available_slots(
        &self,
        doctor_id: Uuid,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Vec<Slot> {
        if from > to {
            return vec![];
        }

        let schedules: Vec<WorkSchedule> = self
            .store
            .work_schedules_for_doctor(doctor_id)
            .await
            .into_iter()
            .filter(|s| s.is_available && s.intersects_dates(from, to))
            .collect();

        if schedules.is_empty() {
            debug!("Doctor {} has no available schedule in {}..{}", doctor_id, from, to);
            return vec![];
        }

        let mut slots = Vec::new();
        let mut date = from;
        loop {
            let windows = merge_windows(day_windows(&schedules, date));
            if !windows.is_empty() {
                let booked: HashSet<NaiveTime> = self
                    .store
                    .bookings_for_doctor_on(doctor_id, date)
                    .await
                    .into_iter()
                    .filter(|b| b.holds_slot())
                    .map(|b| b.time)
                    .collect();

                for (window_start, window_end) in windows {
                    let mut slot_start = align_to_grid(window_start);
                    while slot_start + SLOT_MINUTES as i64 <= window_end {
                        let start_time = minutes_to_time(slot_start);
                        if !booked.contains(&start_time) {
                            slots.push(Slot {
                                doctor_id,
                                date,
                                start_time,
                                end_time: minutes_to_time(slot_start + SLOT_MINUTES as i64),
                            });
                        }
                        slot_start += SLOT_MINUTES as i64;
                    }
                }
            }

            match date.succ_opt() {
                Some(next) if date < to => date = next,
                _ => break,
            }
        }

        debug!("Found {} available slots for doctor {}", slots.len(), doctor_id);
        slots
    }

    /// True when (date, time) falls inside one of the doctor's available
    /// schedule windows and sits on the slot grid.
    pub async fn slot_within_schedule(
        &self,
        doctor_id: Uuid,
        date: NaiveDate,
        time: NaiveTime,
    ) -> bool {
        if !is_on_grid(time) {
            return false;
        }

        let schedules: Vec<WorkSchedule> = self
            .store
            .work_schedules_for_doctor(doctor_id)
            .await
            .into_iter()
            .filter(|s| s.is_available && s.intersects_dates(date, date))
            .collect();

        let slot_start = minutes_from_midnight(time);
        let slot_end = slot_start + SLOT_MINUTES as i64;

        merge_windows(day_windows(&schedules, date))
            .into_iter()
            .any(|(start, end)| slot_start >= start && slot_end <= end)
    }
}

/// True when the time sits on a 30-minute slot boundary.
pub fn is_on_grid(time: NaiveTime) -> bool {
    use chrono::Timelike;
    time.second() == 0 && time.nanosecond() == 0 && time.minute() % SLOT_MINUTES == 0
}

fn minutes_from_midnight(time: NaiveTime) -> i64 {
    use chrono::Timelike;
    time.hour() as i64 * 60 + time.minute() as i64
}

fn minutes_to_time(minutes: i64) -> NaiveTime {
    // A window may close exactly at midnight; 1440 wraps to 00:00.
    NaiveTime::from_num_seconds_from_midnight_opt(((minutes % 1440) * 60) as u32, 0).unwrap()
}

/// Round up to the next slot boundary.
fn align_to_grid(minutes: i64) -> i64 {
    let step = SLOT_MINUTES as i64;
    (minutes as u64).div_ceil(step as u64) as i64 * step
}

/// Clip each schedule window to the given date, as minutes from midnight.
fn day_windows(schedules: &[WorkSchedule], date: NaiveDate) -> Vec<(i64, i64)> {
    let day_start = date.and_hms_opt(0, 0, 0).unwrap().and_utc();
    let day_end = day_start + Duration::days(1);

    schedules
        .iter()
        .filter_map(|schedule| {
            let start = schedule.start_time.max(day_start);
            let end = schedule.end_time.min(day_end);
            if start >= end {
                return None;
            }
            Some((
                (start - day_start).num_minutes(),
                (end - day_start).num_minutes(),
            ))
        })
        .collect()
}

/// Union-merge overlapping or touching windows. Overlapping schedules for
/// one doctor should not exist by invariant, but the calendar merges them
/// anyway rather than emitting duplicate slots.
fn merge_windows(mut windows: Vec<(i64, i64)>) -> Vec<(i64, i64)> {
    if windows.is_empty() {
        return windows;
    }

    windows.sort_unstable();
    let mut merged: Vec<(i64, i64)> = vec![windows[0]];
    for (start, end) in windows.into_iter().skip(1) {
        let last = merged.last_mut().unwrap();
        if start <= last.1 {
            last.1 = last.1.max(end);
        } else {
            merged.push((start, end));
        }
    }
    merged
}
