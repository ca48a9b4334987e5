use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query, State},
    Json,
};
use serde_json::{json, Value};
use uuid::Uuid;

use shared_models::auth::User;
use shared_models::error::AppError;
use shared_store::AppState;

use crate::models::{
    CreateWorkScheduleRequest, ScheduleError, SlotRangeQuery, UpdateWorkScheduleRequest,
};
use crate::services::calendar::SlotCalendarService;
use crate::services::schedule::WorkScheduleService;

fn can_manage_schedules(user: &User) -> bool {
    matches!(
        user.role.as_deref(),
        Some("staff") | Some("manager") | Some("admin")
    )
}

fn map_schedule_error(error: ScheduleError) -> AppError {
    match error {
        ScheduleError::NotFound => AppError::NotFound("Work schedule not found".to_string()),
        ScheduleError::Overlap => {
            AppError::Conflict("Work schedule overlaps an existing window".to_string())
        }
        ScheduleError::ValidationError(msg) => AppError::BadRequest(msg),
    }
}

#[axum::debug_handler]
pub async fn create_work_schedule(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    Json(request): Json<CreateWorkScheduleRequest>,
) -> Result<Json<Value>, AppError> {
    if !can_manage_schedules(&user) {
        return Err(AppError::Auth("Not authorized to manage work schedules".to_string()));
    }

    let schedule_service = WorkScheduleService::new(Arc::clone(&state.store));
    let schedule = schedule_service
        .create_schedule(request)
        .await
        .map_err(map_schedule_error)?;

    Ok(Json(json!({
        "success": true,
        "work_schedule": schedule,
        "message": "Work schedule created successfully"
    })))
}

#[axum::debug_handler]
pub async fn update_work_schedule(
    State(state): State<Arc<AppState>>,
    Path(schedule_id): Path<Uuid>,
    Extension(user): Extension<User>,
    Json(request): Json<UpdateWorkScheduleRequest>,
) -> Result<Json<Value>, AppError> {
    if !can_manage_schedules(&user) {
        return Err(AppError::Auth("Not authorized to manage work schedules".to_string()));
    }

    let schedule_service = WorkScheduleService::new(Arc::clone(&state.store));
    let schedule = schedule_service
        .update_schedule(schedule_id, request)
        .await
        .map_err(map_schedule_error)?;

    Ok(Json(json!({
        "success": true,
        "work_schedule": schedule,
        "message": "Work schedule updated successfully"
    })))
}

#[axum::debug_handler]
pub async fn list_work_schedules(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Value>, AppError> {
    let schedule_service = WorkScheduleService::new(Arc::clone(&state.store));
    let schedules = schedule_service.list_schedules().await;

    Ok(Json(json!({ "data": schedules })))
}

#[axum::debug_handler]
pub async fn get_doctor_work_schedules(
    State(state): State<Arc<AppState>>,
    Path(doctor_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let schedule_service = WorkScheduleService::new(Arc::clone(&state.store));
    let schedules = schedule_service.schedules_for_doctor(doctor_id).await;

    Ok(Json(json!({ "data": schedules })))
}

#[axum::debug_handler]
pub async fn get_available_slots(
    State(state): State<Arc<AppState>>,
    Path(doctor_id): Path<Uuid>,
    Query(range): Query<SlotRangeQuery>,
) -> Result<Json<Value>, AppError> {
    let calendar = SlotCalendarService::new(Arc::clone(&state.store));
    let slots = calendar
        .list_available_slots(doctor_id, range.from, range.to)
        .await;

    Ok(Json(json!({ "data": slots })))
}
