use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info};
use uuid::Uuid;

use shared_models::booking::{Booking, BookingStatus};
use shared_store::{ClinicStore, StoreError};

use crate::models::{Invoice, InvoiceError, InvoiceStatus};

/// Derives billing records from bookings, exactly once per booking.
pub struct InvoiceGeneratorService {
    store: Arc<ClinicStore>,
}

impl InvoiceGeneratorService {
    pub fn new(store: Arc<ClinicStore>) -> Self {
        Self { store }
    }

    /// Create the invoice for a booking, billing the price snapshotted at
    /// reservation time.
    ///
    /// Idempotent: when the booking already has an invoice the existing one
    /// is returned instead of an error. The returned flag reports whether
    /// this call created the invoice.
    pub async fn create_invoice(&self, booking_id: Uuid) -> Result<(Invoice, bool), InvoiceError> {
        debug!("Creating invoice for booking {}", booking_id);

        let booking = self.booking(booking_id).await?;
        if booking.status == BookingStatus::Cancelled {
            return Err(InvoiceError::BookingCancelled);
        }

        let invoice = Invoice {
            id: Uuid::new_v4(),
            booking_id,
            customer_id: booking.customer_id,
            total_amount: booking.price,
            issued_date: Utc::now(),
            status: InvoiceStatus::Pending,
        };

        let (invoice, created) = self.store.insert_invoice_for_booking(invoice).await;
        if created {
            info!("Invoice {} issued for booking {} ({})",
                  invoice.id, booking_id, invoice.total_amount);
        } else {
            debug!("Booking {} already invoiced as {}", booking_id, invoice.id);
        }

        Ok((invoice, created))
    }

    pub async fn get_invoice(&self, invoice_id: Uuid) -> Result<Invoice, InvoiceError> {
        self.store
            .invoice(invoice_id)
            .await
            .ok_or(InvoiceError::NotFound)
    }

    pub async fn invoice_for_booking(&self, booking_id: Uuid) -> Result<Invoice, InvoiceError> {
        self.store
            .invoice_for_booking(booking_id)
            .await
            .ok_or(InvoiceError::NotFound)
    }

    pub async fn invoices_for_customer(&self, customer_id: Uuid) -> Vec<Invoice> {
        self.store.invoices_for_customer(customer_id).await
    }

    /// Pending -> Cancelled. Paid invoices cannot be cancelled.
    pub async fn cancel_invoice(&self, invoice_id: Uuid) -> Result<Invoice, InvoiceError> {
        let invoice = self
            .store
            .cancel_invoice(invoice_id)
            .await
            .map_err(|e| match e {
                StoreError::NotFound => InvoiceError::NotFound,
                StoreError::InvoiceAlreadyPaid => InvoiceError::AlreadyPaid,
                _ => InvoiceError::NotFound,
            })?;

        info!("Invoice {} cancelled", invoice.id);
        Ok(invoice)
    }

    /// Booking lookup used for invoicing and for handler-side ownership
    /// checks.
    pub async fn booking(&self, booking_id: Uuid) -> Result<Booking, InvoiceError> {
        self.store
            .booking(booking_id)
            .await
            .ok_or(InvoiceError::BookingNotFound)
    }
}
