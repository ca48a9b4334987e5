use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub use shared_models::scheduling::{Slot, WorkSchedule, SLOT_MINUTES};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateWorkScheduleRequest {
    pub doctor_id: Uuid,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateWorkScheduleRequest {
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub is_available: Option<bool>,
}

/// Inclusive date range for slot queries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlotRangeQuery {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum ScheduleError {
    #[error("Work schedule not found")]
    NotFound,

    #[error("Work schedule overlaps an existing window")]
    Overlap,

    #[error("Validation error: {0}")]
    ValidationError(String),
}
