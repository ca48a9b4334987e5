use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub use shared_models::booking::{Booking, BookingStatus};

/// Payload of the booking form. Every field is typed and validated before
/// any state is touched.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReserveBookingRequest {
    pub customer_id: Uuid,
    pub doctor_id: Uuid,
    pub service_id: Uuid,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateBookingStatusRequest {
    pub status: BookingStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CancelBookingRequest {
    pub reason: Option<String>,
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum BookingError {
    #[error("Booking not found")]
    NotFound,

    #[error("Slot conflicts with an existing booking")]
    SlotConflict,

    #[error("Requested time is outside the doctor's work schedule")]
    OutsideSchedule,

    #[error("Booking cannot be modified in current status: {0}")]
    InvalidStatusTransition(BookingStatus),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Internal error: {0}")]
    Internal(String),
}
