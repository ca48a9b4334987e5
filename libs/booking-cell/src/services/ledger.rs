use std::sync::Arc;

use chrono::{NaiveDate, NaiveTime, Utc};
use tracing::{debug, info, warn};
use uuid::Uuid;

use schedule_cell::services::calendar::{is_on_grid, SlotCalendarService};
use shared_store::ClinicStore;

use crate::models::{Booking, BookingError, BookingStatus, ReserveBookingRequest};
use crate::services::conflict::SlotConflictService;
use crate::services::lifecycle::BookingLifecycleService;

const MAX_RESERVE_ATTEMPTS: u32 = 3;

/// The booking ledger: records reservations against slots and drives the
/// booking state machine. Two concurrent reservation attempts on the same
/// slot must produce exactly one booking.
pub struct BookingLedgerService {
    store: Arc<ClinicStore>,
    calendar: SlotCalendarService,
    conflict_service: SlotConflictService,
    lifecycle_service: BookingLifecycleService,
}

impl BookingLedgerService {
    pub fn new(store: Arc<ClinicStore>) -> Self {
        let calendar = SlotCalendarService::new(Arc::clone(&store));
        let conflict_service = SlotConflictService::new(Arc::clone(&store));
        let lifecycle_service = BookingLifecycleService::new();

        Self {
            store,
            calendar,
            conflict_service,
            lifecycle_service,
        }
    }

    /// Reserve a slot for a customer.
    ///
    /// Validation happens before any state mutation; the conflict check and
    /// insert then run under a per-slot lock as a single logical
    /// transaction. Lock contention is retried a bounded number of times
    /// and then surfaces as a generic failure.
    pub async fn reserve(&self, request: ReserveBookingRequest) -> Result<Booking, BookingError> {
        info!("Reserving slot {} {} with doctor {} for customer {}",
              request.date, request.time, request.doctor_id, request.customer_id);

        self.validate_reserve_request(&request)?;

        let service = self
            .store
            .service(request.service_id)
            .await
            .filter(|s| s.is_active)
            .ok_or_else(|| {
                BookingError::ValidationError("Unknown or inactive service".to_string())
            })?;

        let in_schedule = self
            .calendar
            .slot_within_schedule(request.doctor_id, request.date, request.time)
            .await;
        if !in_schedule {
            return Err(BookingError::OutsideSchedule);
        }

        let lock_key = slot_lock_key(request.doctor_id, request.date, request.time);

        for attempt in 1..=MAX_RESERVE_ATTEMPTS {
            if self.store.try_lock_slot(&lock_key).await {
                let result = self.try_reserve_locked(&request, service.price).await;
                self.store.unlock_slot(&lock_key).await;
                return result;
            }

            if attempt < MAX_RESERVE_ATTEMPTS {
                warn!("Reservation lock contention on {} (attempt {}/{})",
                      lock_key, attempt, MAX_RESERVE_ATTEMPTS);
                tokio::time::sleep(std::time::Duration::from_millis(50 * attempt as u64)).await;
            }
        }

        Err(BookingError::Internal(
            "Failed to reserve slot after multiple attempts".to_string(),
        ))
    }

    /// Conflict check and insert, only ever called while holding the slot
    /// lock.
    async fn try_reserve_locked(
        &self,
        request: &ReserveBookingRequest,
        price: i64,
    ) -> Result<Booking, BookingError> {
        let slot_taken = self
            .conflict_service
            .find_slot_conflict(request.doctor_id, request.date, request.time)
            .await
            .is_some();
        if slot_taken {
            return Err(BookingError::SlotConflict);
        }

        let customer_busy = self
            .conflict_service
            .find_customer_conflict(request.customer_id, request.date, request.time)
            .await
            .is_some();
        if customer_busy {
            return Err(BookingError::SlotConflict);
        }

        let now = Utc::now();
        let booking = Booking {
            id: Uuid::new_v4(),
            customer_id: request.customer_id,
            doctor_id: request.doctor_id,
            service_id: request.service_id,
            date: request.date,
            time: request.time,
            notes: request.notes.clone(),
            status: BookingStatus::Requested,
            price,
            created_at: now,
            updated_at: now,
        };

        let booking = self.store.insert_booking(booking).await;
        info!("Booking {} reserved for customer {}", booking.id, booking.customer_id);
        Ok(booking)
    }

    pub async fn get_booking(&self, booking_id: Uuid) -> Result<Booking, BookingError> {
        debug!("Fetching booking: {}", booking_id);
        self.store
            .booking(booking_id)
            .await
            .ok_or(BookingError::NotFound)
    }

    pub async fn bookings_for_customer(&self, customer_id: Uuid) -> Vec<Booking> {
        self.store.bookings_for_customer(customer_id).await
    }

    pub async fn bookings_for_doctor(&self, doctor_id: Uuid) -> Vec<Booking> {
        self.store.bookings_for_doctor(doctor_id).await
    }

    /// Move a booking through its state machine. Terminal states admit no
    /// transition.
    pub async fn update_status(
        &self,
        booking_id: Uuid,
        new_status: BookingStatus,
    ) -> Result<Booking, BookingError> {
        debug!("Updating booking {} to {}", booking_id, new_status);

        let updated = self
            .store
            .with_booking_mut(booking_id, |booking| {
                self.lifecycle_service
                    .validate_status_transition(&booking.status, &new_status)?;
                booking.status = new_status;
                Ok(())
            })
            .await?;

        let booking = updated.ok_or(BookingError::NotFound)?;
        info!("Booking {} is now {}", booking.id, booking.status);
        Ok(booking)
    }

    /// Cancel a booking, releasing its slot back into the calendar view.
    /// Cancelled bookings are retained for audit, never deleted.
    pub async fn cancel(
        &self,
        booking_id: Uuid,
        reason: Option<String>,
    ) -> Result<Booking, BookingError> {
        debug!("Cancelling booking: {}", booking_id);

        let updated = self
            .store
            .with_booking_mut(booking_id, |booking| {
                self.lifecycle_service
                    .validate_status_transition(&booking.status, &BookingStatus::Cancelled)?;
                booking.status = BookingStatus::Cancelled;
                if let Some(reason) = &reason {
                    let note = format!("Cancelled: {}", reason);
                    booking.notes = match booking.notes.take() {
                        Some(existing) => Some(format!("{} | {}", existing, note)),
                        None => Some(note),
                    };
                }
                Ok(())
            })
            .await?;

        let booking = updated.ok_or(BookingError::NotFound)?;
        info!("Booking {} cancelled", booking.id);
        Ok(booking)
    }

    fn validate_reserve_request(&self, request: &ReserveBookingRequest) -> Result<(), BookingError> {
        if !is_on_grid(request.time) {
            return Err(BookingError::ValidationError(format!(
                "Booking time must be aligned to the {}-minute slot grid",
                shared_models::scheduling::SLOT_MINUTES
            )));
        }

        if let Some(notes) = &request.notes {
            if notes.len() > 2000 {
                return Err(BookingError::ValidationError(
                    "Notes must not exceed 2000 characters".to_string(),
                ));
            }
        }

        Ok(())
    }
}

fn slot_lock_key(doctor_id: Uuid, date: NaiveDate, time: NaiveTime) -> String {
    format!("slot:{}:{}:{}", doctor_id, date, time)
}
