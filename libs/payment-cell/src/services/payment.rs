use std::sync::Arc;

use tracing::{debug, info};
use uuid::Uuid;

use shared_store::{ClinicStore, StoreError};

use crate::models::{Invoice, Payment, PaymentError, RecordPaymentRequest};

/// Records payment attempts against invoices and settles them once the
/// cumulative amount covers the total.
pub struct PaymentProcessorService {
    store: Arc<ClinicStore>,
}

impl PaymentProcessorService {
    pub fn new(store: Arc<ClinicStore>) -> Self {
        Self { store }
    }

    /// Record one payment attempt. A payment short of the total leaves the
    /// invoice pending; there is no partial-paid state. Payments against a
    /// paid invoice are rejected, never silently accepted.
    pub async fn record_payment(
        &self,
        request: RecordPaymentRequest,
    ) -> Result<(Payment, Invoice), PaymentError> {
        if request.amount <= 0 {
            return Err(PaymentError::ValidationError(
                "Payment amount must be positive".to_string(),
            ));
        }

        let (payment, invoice) = self
            .store
            .apply_payment(request.invoice_id, request.amount, request.method)
            .await
            .map_err(map_store_error)?;

        info!("Payment {} of {} recorded against invoice {} (status: {})",
              payment.id, payment.amount, invoice.id, invoice.status);

        Ok((payment, invoice))
    }

    /// Payment history for an invoice, oldest first.
    pub async fn payments_for_invoice(
        &self,
        invoice_id: Uuid,
    ) -> Result<Vec<Payment>, PaymentError> {
        // 404 for unknown invoices rather than an empty history.
        self.invoice(invoice_id).await?;

        let payments = self.store.payments_for_invoice(invoice_id).await;
        debug!("Invoice {} has {} recorded payments", invoice_id, payments.len());
        Ok(payments)
    }

    /// Amount still owed on an invoice.
    pub async fn outstanding_amount(&self, invoice: &Invoice) -> i64 {
        let settled = self.store.settled_amount(invoice.id).await;
        (invoice.total_amount - settled).max(0)
    }

    pub async fn invoice(&self, invoice_id: Uuid) -> Result<Invoice, PaymentError> {
        self.store
            .invoice(invoice_id)
            .await
            .ok_or(PaymentError::InvoiceNotFound)
    }
}

fn map_store_error(error: StoreError) -> PaymentError {
    match error {
        StoreError::NotFound => PaymentError::InvoiceNotFound,
        StoreError::InvoiceAlreadyPaid => PaymentError::AlreadyPaid,
        StoreError::InvoiceCancelled => PaymentError::InvoiceCancelled,
        StoreError::ScheduleOverlap => {
            PaymentError::ValidationError("Unexpected store error".to_string())
        }
    }
}
