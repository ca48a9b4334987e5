use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub use shared_models::billing::{Invoice, InvoiceStatus, Payment, PaymentMethod};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordPaymentRequest {
    pub invoice_id: Uuid,
    pub amount: i64,
    /// The portal's default payment path is the bank transfer.
    #[serde(default = "default_payment_method")]
    pub method: PaymentMethod,
}

fn default_payment_method() -> PaymentMethod {
    PaymentMethod::Banking
}

/// Payload for the asynchronous bank-transfer path. `qr_code_base64` is
/// optional; when absent the client renders the QR from `qr_content`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentQrResponse {
    pub qr_content: String,
    pub qr_code_base64: Option<String>,
    pub bank_info: String,
    pub account_number: String,
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum PaymentError {
    #[error("Invoice not found")]
    InvoiceNotFound,

    #[error("Invoice is already paid")]
    AlreadyPaid,

    #[error("Invoice has been cancelled")]
    InvoiceCancelled,

    #[error("Validation error: {0}")]
    ValidationError(String),
}
