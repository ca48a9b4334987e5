use std::collections::{HashMap, HashSet};

use chrono::{NaiveDate, NaiveTime, Utc};
use thiserror::Error;
use tokio::sync::{Mutex, RwLock};
use tracing::debug;
use uuid::Uuid;

use shared_models::billing::{Invoice, InvoiceStatus, Payment, PaymentMethod};
use shared_models::booking::Booking;
use shared_models::catalog::TreatmentService;
use shared_models::scheduling::WorkSchedule;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("record not found")]
    NotFound,

    #[error("work schedule overlaps an existing window")]
    ScheduleOverlap,

    #[error("invoice is already paid")]
    InvoiceAlreadyPaid,

    #[error("invoice has been cancelled")]
    InvoiceCancelled,
}

/// In-memory record store for bookings, invoices, payments, schedules and
/// the treatment catalog.
///
/// Single-table operations take that table's lock; the multi-record
/// operations (`insert_invoice_for_booking`, `apply_payment`) hold their
/// write locks across the whole check-then-mutate sequence. Lock order is
/// always invoices before payments.
#[derive(Default)]
pub struct ClinicStore {
    work_schedules: RwLock<HashMap<Uuid, WorkSchedule>>,
    bookings: RwLock<HashMap<Uuid, Booking>>,
    invoices: RwLock<HashMap<Uuid, Invoice>>,
    payments: RwLock<HashMap<Uuid, Payment>>,
    services: RwLock<HashMap<Uuid, TreatmentService>>,
    slot_locks: Mutex<HashSet<String>>,
}

impl ClinicStore {
    pub fn new() -> Self {
        Self::default()
    }

    // ==========================================================================
    // WORK SCHEDULES
    // ==========================================================================

    /// Insert a schedule, rejecting any overlap with the doctor's other
    /// available windows. Superseded (unavailable) rows do not block.
    pub async fn insert_work_schedule(
        &self,
        schedule: WorkSchedule,
    ) -> Result<WorkSchedule, StoreError> {
        let mut schedules = self.work_schedules.write().await;

        let overlaps = schedules.values().any(|existing| {
            existing.doctor_id == schedule.doctor_id
                && existing.is_available
                && windows_overlap(existing, &schedule)
        });
        if overlaps {
            return Err(StoreError::ScheduleOverlap);
        }

        schedules.insert(schedule.id, schedule.clone());
        debug!("Work schedule {} stored for doctor {}", schedule.id, schedule.doctor_id);
        Ok(schedule)
    }

    /// Apply a mutation to a schedule, re-checking the overlap invariant
    /// before committing the change.
    pub async fn update_work_schedule<F>(
        &self,
        id: Uuid,
        apply: F,
    ) -> Result<WorkSchedule, StoreError>
    where
        F: FnOnce(&mut WorkSchedule),
    {
        let mut schedules = self.work_schedules.write().await;

        let mut updated = schedules.get(&id).cloned().ok_or(StoreError::NotFound)?;
        apply(&mut updated);
        updated.updated_at = Utc::now();

        if updated.is_available {
            let overlaps = schedules.values().any(|existing| {
                existing.id != id
                    && existing.doctor_id == updated.doctor_id
                    && existing.is_available
                    && windows_overlap(existing, &updated)
            });
            if overlaps {
                return Err(StoreError::ScheduleOverlap);
            }
        }

        schedules.insert(id, updated.clone());
        Ok(updated)
    }

    pub async fn work_schedule(&self, id: Uuid) -> Option<WorkSchedule> {
        self.work_schedules.read().await.get(&id).cloned()
    }

    pub async fn work_schedules(&self) -> Vec<WorkSchedule> {
        let mut all: Vec<WorkSchedule> =
            self.work_schedules.read().await.values().cloned().collect();
        all.sort_by_key(|s| s.start_time);
        all
    }

    pub async fn work_schedules_for_doctor(&self, doctor_id: Uuid) -> Vec<WorkSchedule> {
        let mut rows: Vec<WorkSchedule> = self
            .work_schedules
            .read()
            .await
            .values()
            .filter(|s| s.doctor_id == doctor_id)
            .cloned()
            .collect();
        rows.sort_by_key(|s| s.start_time);
        rows
    }

    // ==========================================================================
    // SLOT LOCKS
    // ==========================================================================

    /// Try to take the short-lived reservation lock for one slot key.
    /// Returns false when another reservation currently holds it.
    pub async fn try_lock_slot(&self, key: &str) -> bool {
        self.slot_locks.lock().await.insert(key.to_string())
    }

    pub async fn unlock_slot(&self, key: &str) {
        self.slot_locks.lock().await.remove(key);
    }

    // ==========================================================================
    // BOOKINGS
    // ==========================================================================

    pub async fn insert_booking(&self, booking: Booking) -> Booking {
        self.bookings
            .write()
            .await
            .insert(booking.id, booking.clone());
        debug!("Booking {} stored for doctor {} at {} {}",
               booking.id, booking.doctor_id, booking.date, booking.time);
        booking
    }

    pub async fn booking(&self, id: Uuid) -> Option<Booking> {
        self.bookings.read().await.get(&id).cloned()
    }

    /// The non-cancelled booking holding (doctor, date, time), if any.
    pub async fn active_booking_at(
        &self,
        doctor_id: Uuid,
        date: NaiveDate,
        time: NaiveTime,
    ) -> Option<Booking> {
        self.bookings
            .read()
            .await
            .values()
            .find(|b| {
                b.doctor_id == doctor_id && b.date == date && b.time == time && b.holds_slot()
            })
            .cloned()
    }

    /// The customer's own non-cancelled booking at (date, time) with any
    /// doctor, if one exists.
    pub async fn customer_booking_at(
        &self,
        customer_id: Uuid,
        date: NaiveDate,
        time: NaiveTime,
    ) -> Option<Booking> {
        self.bookings
            .read()
            .await
            .values()
            .find(|b| {
                b.customer_id == customer_id && b.date == date && b.time == time && b.holds_slot()
            })
            .cloned()
    }

    pub async fn bookings_for_customer(&self, customer_id: Uuid) -> Vec<Booking> {
        let mut rows: Vec<Booking> = self
            .bookings
            .read()
            .await
            .values()
            .filter(|b| b.customer_id == customer_id)
            .cloned()
            .collect();
        rows.sort_by_key(|b| (b.date, b.time));
        rows
    }

    pub async fn bookings_for_doctor(&self, doctor_id: Uuid) -> Vec<Booking> {
        let mut rows: Vec<Booking> = self
            .bookings
            .read()
            .await
            .values()
            .filter(|b| b.doctor_id == doctor_id)
            .cloned()
            .collect();
        rows.sort_by_key(|b| (b.date, b.time));
        rows
    }

    pub async fn bookings_for_doctor_on(&self, doctor_id: Uuid, date: NaiveDate) -> Vec<Booking> {
        let mut rows: Vec<Booking> = self
            .bookings
            .read()
            .await
            .values()
            .filter(|b| b.doctor_id == doctor_id && b.date == date)
            .cloned()
            .collect();
        rows.sort_by_key(|b| b.time);
        rows
    }

    /// Mutate one booking under the table write lock. Returns Ok(None) for
    /// an unknown id; the closure's error aborts without committing.
    pub async fn with_booking_mut<E, F>(&self, id: Uuid, apply: F) -> Result<Option<Booking>, E>
    where
        F: FnOnce(&mut Booking) -> Result<(), E>,
    {
        let mut bookings = self.bookings.write().await;
        match bookings.get_mut(&id) {
            None => Ok(None),
            Some(booking) => {
                apply(booking)?;
                booking.updated_at = Utc::now();
                Ok(Some(booking.clone()))
            }
        }
    }

    // ==========================================================================
    // INVOICES & PAYMENTS
    // ==========================================================================

    /// Insert an invoice unless the booking already has one. Returns the
    /// stored invoice plus whether this call created it.
    pub async fn insert_invoice_for_booking(&self, invoice: Invoice) -> (Invoice, bool) {
        let mut invoices = self.invoices.write().await;

        if let Some(existing) = invoices
            .values()
            .find(|i| i.booking_id == invoice.booking_id)
        {
            return (existing.clone(), false);
        }

        invoices.insert(invoice.id, invoice.clone());
        debug!("Invoice {} stored for booking {}", invoice.id, invoice.booking_id);
        (invoice, true)
    }

    pub async fn invoice(&self, id: Uuid) -> Option<Invoice> {
        self.invoices.read().await.get(&id).cloned()
    }

    pub async fn invoice_for_booking(&self, booking_id: Uuid) -> Option<Invoice> {
        self.invoices
            .read()
            .await
            .values()
            .find(|i| i.booking_id == booking_id)
            .cloned()
    }

    pub async fn invoices_for_customer(&self, customer_id: Uuid) -> Vec<Invoice> {
        let mut rows: Vec<Invoice> = self
            .invoices
            .read()
            .await
            .values()
            .filter(|i| i.customer_id == customer_id)
            .cloned()
            .collect();
        rows.sort_by_key(|i| std::cmp::Reverse(i.issued_date));
        rows
    }

    /// Pending -> Cancelled. Cancelling a paid invoice is refused; a
    /// cancelled invoice stays cancelled.
    pub async fn cancel_invoice(&self, id: Uuid) -> Result<Invoice, StoreError> {
        let mut invoices = self.invoices.write().await;
        let invoice = invoices.get_mut(&id).ok_or(StoreError::NotFound)?;

        match invoice.status {
            InvoiceStatus::Paid => Err(StoreError::InvoiceAlreadyPaid),
            InvoiceStatus::Cancelled => Ok(invoice.clone()),
            InvoiceStatus::Pending => {
                invoice.status = InvoiceStatus::Cancelled;
                Ok(invoice.clone())
            }
        }
    }

    /// Record a payment and settle the invoice once the cumulative amount
    /// reaches its total. Paid and cancelled invoices are refused.
    pub async fn apply_payment(
        &self,
        invoice_id: Uuid,
        amount: i64,
        method: PaymentMethod,
    ) -> Result<(Payment, Invoice), StoreError> {
        let mut invoices = self.invoices.write().await;
        let invoice = invoices.get_mut(&invoice_id).ok_or(StoreError::NotFound)?;

        match invoice.status {
            InvoiceStatus::Paid => return Err(StoreError::InvoiceAlreadyPaid),
            InvoiceStatus::Cancelled => return Err(StoreError::InvoiceCancelled),
            InvoiceStatus::Pending => {}
        }

        let mut payments = self.payments.write().await;
        let payment = Payment {
            id: Uuid::new_v4(),
            invoice_id,
            amount,
            method,
            payment_date: Utc::now(),
        };
        payments.insert(payment.id, payment.clone());

        let settled: i64 = payments
            .values()
            .filter(|p| p.invoice_id == invoice_id)
            .map(|p| p.amount)
            .sum();
        if settled >= invoice.total_amount {
            invoice.status = InvoiceStatus::Paid;
            debug!("Invoice {} settled ({} / {})", invoice_id, settled, invoice.total_amount);
        }

        Ok((payment, invoice.clone()))
    }

    pub async fn payments_for_invoice(&self, invoice_id: Uuid) -> Vec<Payment> {
        let mut rows: Vec<Payment> = self
            .payments
            .read()
            .await
            .values()
            .filter(|p| p.invoice_id == invoice_id)
            .cloned()
            .collect();
        rows.sort_by_key(|p| p.payment_date);
        rows
    }

    /// Total amount recorded against an invoice so far.
    pub async fn settled_amount(&self, invoice_id: Uuid) -> i64 {
        self.payments
            .read()
            .await
            .values()
            .filter(|p| p.invoice_id == invoice_id)
            .map(|p| p.amount)
            .sum()
    }

    // ==========================================================================
    // TREATMENT CATALOG
    // ==========================================================================

    pub async fn insert_service(&self, service: TreatmentService) -> TreatmentService {
        self.services
            .write()
            .await
            .insert(service.id, service.clone());
        service
    }

    pub async fn service(&self, id: Uuid) -> Option<TreatmentService> {
        self.services.read().await.get(&id).cloned()
    }

    pub async fn services(&self) -> Vec<TreatmentService> {
        let mut all: Vec<TreatmentService> =
            self.services.read().await.values().cloned().collect();
        all.sort_by(|a, b| a.name.cmp(&b.name));
        all
    }
}

fn windows_overlap(a: &WorkSchedule, b: &WorkSchedule) -> bool {
    a.start_time < b.end_time && a.end_time > b.start_time
}
