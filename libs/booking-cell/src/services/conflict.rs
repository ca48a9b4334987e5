use std::sync::Arc;

use chrono::{NaiveDate, NaiveTime};
use tracing::debug;
use uuid::Uuid;

use shared_store::ClinicStore;

use crate::models::Booking;

/// Slot-collision checks backing the booking ledger. Both checks consider
/// only non-cancelled bookings: a cancelled booking releases its slot.
pub struct SlotConflictService {
    store: Arc<ClinicStore>,
}

impl SlotConflictService {
    pub fn new(store: Arc<ClinicStore>) -> Self {
        Self { store }
    }

    /// The booking currently holding (doctor, date, time), if any.
    pub async fn find_slot_conflict(
        &self,
        doctor_id: Uuid,
        date: NaiveDate,
        time: NaiveTime,
    ) -> Option<Booking> {
        let conflict = self.store.active_booking_at(doctor_id, date, time).await;
        if let Some(ref existing) = conflict {
            debug!("Slot {} {} for doctor {} held by booking {}",
                   date, time, doctor_id, existing.id);
        }
        conflict
    }

    /// The customer's own booking at (date, time) with any doctor, if any.
    /// One customer cannot hold two appointments in the same slot.
    pub async fn find_customer_conflict(
        &self,
        customer_id: Uuid,
        date: NaiveDate,
        time: NaiveTime,
    ) -> Option<Booking> {
        self.store.customer_booking_at(customer_id, date, time).await
    }
}
