use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Bookable slot granularity. The portal's canonical slot list
/// (07:00 .. 16:30) runs on this grid.
pub const SLOT_MINUTES: u32 = 30;

/// A doctor's declared availability window. Never deleted: a schedule is
/// superseded by marking it unavailable and creating a replacement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkSchedule {
    pub id: Uuid,
    pub doctor_id: Uuid,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub is_available: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl WorkSchedule {
    /// True when the window intersects the given date range (inclusive).
    pub fn intersects_dates(&self, from: NaiveDate, to: NaiveDate) -> bool {
        self.start_time.date_naive() <= to && self.end_time.date_naive() >= from
    }
}

/// A derived 30-minute bookable window. Computed on demand from a
/// WorkSchedule, never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slot {
    pub doctor_id: Uuid,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
}
