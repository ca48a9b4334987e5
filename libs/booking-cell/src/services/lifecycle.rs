use tracing::{debug, warn};

use crate::models::{BookingError, BookingStatus};

pub struct BookingLifecycleService;

impl BookingLifecycleService {
    pub fn new() -> Self {
        Self
    }

    /// Validate that a status transition is allowed.
    pub fn validate_status_transition(
        &self,
        current_status: &BookingStatus,
        new_status: &BookingStatus,
    ) -> Result<(), BookingError> {
        debug!("Validating status transition from {} to {}", current_status, new_status);

        let valid_transitions = self.get_valid_transitions(current_status);

        if !valid_transitions.contains(new_status) {
            warn!("Invalid status transition attempted: {} -> {}", current_status, new_status);
            return Err(BookingError::InvalidStatusTransition(*current_status));
        }

        Ok(())
    }

    /// All valid next statuses for a given current status.
    pub fn get_valid_transitions(&self, current_status: &BookingStatus) -> Vec<BookingStatus> {
        match current_status {
            BookingStatus::Requested => vec![
                BookingStatus::Confirmed,
                BookingStatus::Cancelled,
            ],
            BookingStatus::Confirmed => vec![
                BookingStatus::Completed,
                BookingStatus::Cancelled,
            ],
            // Terminal states - no transitions allowed
            BookingStatus::Completed => vec![],
            BookingStatus::Cancelled => vec![],
        }
    }
}

impl Default for BookingLifecycleService {
    fn default() -> Self {
        Self::new()
    }
}
