use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info};
use uuid::Uuid;

use shared_store::{ClinicStore, StoreError};

use crate::models::{
    CreateWorkScheduleRequest, ScheduleError, UpdateWorkScheduleRequest, WorkSchedule,
};

pub struct WorkScheduleService {
    store: Arc<ClinicStore>,
}

impl WorkScheduleService {
    pub fn new(store: Arc<ClinicStore>) -> Self {
        Self { store }
    }

    /// Create an availability window for a doctor. Overlapping windows for
    /// the same doctor are rejected; superseded windows do not count.
    pub async fn create_schedule(
        &self,
        request: CreateWorkScheduleRequest,
    ) -> Result<WorkSchedule, ScheduleError> {
        debug!("Creating work schedule for doctor {}", request.doctor_id);

        if request.start_time >= request.end_time {
            return Err(ScheduleError::ValidationError(
                "Start time must be before end time".to_string(),
            ));
        }

        let now = Utc::now();
        let schedule = WorkSchedule {
            id: Uuid::new_v4(),
            doctor_id: request.doctor_id,
            start_time: request.start_time,
            end_time: request.end_time,
            is_available: true,
            created_at: now,
            updated_at: now,
        };

        let schedule = self
            .store
            .insert_work_schedule(schedule)
            .await
            .map_err(|e| match e {
                StoreError::ScheduleOverlap => ScheduleError::Overlap,
                _ => ScheduleError::ValidationError(e.to_string()),
            })?;

        info!("Work schedule {} created for doctor {}", schedule.id, schedule.doctor_id);
        Ok(schedule)
    }

    /// Update a schedule's window or availability. Schedules are never
    /// deleted: to retire one, mark it unavailable and create a
    /// replacement window.
    pub async fn update_schedule(
        &self,
        schedule_id: Uuid,
        request: UpdateWorkScheduleRequest,
    ) -> Result<WorkSchedule, ScheduleError> {
        debug!("Updating work schedule {}", schedule_id);

        let current = self
            .store
            .work_schedule(schedule_id)
            .await
            .ok_or(ScheduleError::NotFound)?;

        let start_time = request.start_time.unwrap_or(current.start_time);
        let end_time = request.end_time.unwrap_or(current.end_time);
        if start_time >= end_time {
            return Err(ScheduleError::ValidationError(
                "Start time must be before end time".to_string(),
            ));
        }

        let updated = self
            .store
            .update_work_schedule(schedule_id, |schedule| {
                schedule.start_time = start_time;
                schedule.end_time = end_time;
                if let Some(is_available) = request.is_available {
                    schedule.is_available = is_available;
                }
            })
            .await
            .map_err(|e| match e {
                StoreError::NotFound => ScheduleError::NotFound,
                StoreError::ScheduleOverlap => ScheduleError::Overlap,
                _ => ScheduleError::ValidationError(e.to_string()),
            })?;

        Ok(updated)
    }

    pub async fn get_schedule(&self, schedule_id: Uuid) -> Result<WorkSchedule, ScheduleError> {
        self.store
            .work_schedule(schedule_id)
            .await
            .ok_or(ScheduleError::NotFound)
    }

    pub async fn list_schedules(&self) -> Vec<WorkSchedule> {
        self.store.work_schedules().await
    }

    pub async fn schedules_for_doctor(&self, doctor_id: Uuid) -> Vec<WorkSchedule> {
        self.store.work_schedules_for_doctor(doctor_id).await
    }
}
