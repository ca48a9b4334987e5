use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub use shared_models::billing::{Invoice, InvoiceStatus};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateInvoiceRequest {
    pub booking_id: Uuid,
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum InvoiceError {
    #[error("Booking not found")]
    BookingNotFound,

    #[error("Invoice not found")]
    NotFound,

    #[error("Cancelled bookings cannot be invoiced")]
    BookingCancelled,

    #[error("Invoice is already paid")]
    AlreadyPaid,
}
