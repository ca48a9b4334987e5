use std::sync::Arc;

use serde_json::json;
use tracing::debug;
use uuid::Uuid;

use shared_config::AppConfig;
use shared_store::ClinicStore;

use crate::models::{InvoiceStatus, PaymentError, PaymentQrResponse};
use crate::services::payment::PaymentProcessorService;

/// Builds the bank-transfer QR payload for an invoice. Regenerating is a
/// plain repeat call; settled and cancelled invoices are refused.
pub struct PaymentQrService {
    processor: PaymentProcessorService,
    bank_name: String,
    bank_account_number: String,
    bank_account_holder: String,
}

impl PaymentQrService {
    pub fn new(store: Arc<ClinicStore>, config: &AppConfig) -> Self {
        Self {
            processor: PaymentProcessorService::new(store),
            bank_name: config.bank_name.clone(),
            bank_account_number: config.bank_account_number.clone(),
            bank_account_holder: config.bank_account_holder.clone(),
        }
    }

    pub async fn get_payment_qr(&self, invoice_id: Uuid) -> Result<PaymentQrResponse, PaymentError> {
        let invoice = self.processor.invoice(invoice_id).await?;

        match invoice.status {
            InvoiceStatus::Paid => return Err(PaymentError::AlreadyPaid),
            InvoiceStatus::Cancelled => return Err(PaymentError::InvoiceCancelled),
            InvoiceStatus::Pending => {}
        }

        let outstanding = self.processor.outstanding_amount(&invoice).await;
        debug!("Building payment QR for invoice {} ({} outstanding)", invoice_id, outstanding);

        let qr_content = json!({
            "bank": self.bank_name,
            "account_number": self.bank_account_number,
            "account_holder": self.bank_account_holder,
            "amount": outstanding,
            "memo": format!("Payment for invoice {}", invoice.id),
        })
        .to_string();

        Ok(PaymentQrResponse {
            qr_content,
            // Rendering happens client-side from qr_content.
            qr_code_base64: None,
            bank_info: format!("{} - {}", self.bank_name, self.bank_account_holder),
            account_number: self.bank_account_number.clone(),
        })
    }
}
