use std::sync::Arc;

use axum::{
    extract::{Extension, Path, State},
    Json,
};
use serde_json::{json, Value};
use uuid::Uuid;

use shared_models::auth::User;
use shared_models::error::AppError;
use shared_store::AppState;

use crate::models::{
    BookingError, CancelBookingRequest, ReserveBookingRequest, UpdateBookingStatusRequest,
};
use crate::services::ledger::BookingLedgerService;

fn is_clinic_side(user: &User) -> bool {
    matches!(
        user.role.as_deref(),
        Some("staff") | Some("manager") | Some("admin")
    )
}

fn map_booking_error(error: BookingError) -> AppError {
    match error {
        BookingError::NotFound => AppError::NotFound("Booking not found".to_string()),
        BookingError::SlotConflict => {
            AppError::Conflict("Slot conflicts with an existing booking".to_string())
        }
        BookingError::OutsideSchedule => {
            AppError::BadRequest("Requested time is outside the doctor's work schedule".to_string())
        }
        BookingError::InvalidStatusTransition(status) => {
            AppError::BadRequest(format!("Booking cannot be modified in status {}", status))
        }
        BookingError::ValidationError(msg) => AppError::BadRequest(msg),
        BookingError::Internal(msg) => AppError::Internal(msg),
    }
}

#[axum::debug_handler]
pub async fn reserve_booking(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    Json(request): Json<ReserveBookingRequest>,
) -> Result<Json<Value>, AppError> {
    // Customers reserve for themselves; clinic staff may book on behalf.
    let is_own_booking = request.customer_id.to_string() == user.id;
    if !is_own_booking && !is_clinic_side(&user) {
        return Err(AppError::Auth("Not authorized to book for this customer".to_string()));
    }

    let ledger = BookingLedgerService::new(Arc::clone(&state.store));
    let booking = ledger.reserve(request).await.map_err(map_booking_error)?;

    Ok(Json(json!({
        "success": true,
        "booking": booking,
        "message": "Booking created successfully"
    })))
}

#[axum::debug_handler]
pub async fn get_booking(
    State(state): State<Arc<AppState>>,
    Path(booking_id): Path<Uuid>,
    Extension(user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    let ledger = BookingLedgerService::new(Arc::clone(&state.store));
    let booking = ledger
        .get_booking(booking_id)
        .await
        .map_err(map_booking_error)?;

    let is_customer = booking.customer_id.to_string() == user.id;
    let is_doctor = booking.doctor_id.to_string() == user.id;
    if !is_customer && !is_doctor && !is_clinic_side(&user) {
        return Err(AppError::Auth("Not authorized to view this booking".to_string()));
    }

    Ok(Json(json!(booking)))
}

#[axum::debug_handler]
pub async fn get_customer_bookings(
    State(state): State<Arc<AppState>>,
    Path(customer_id): Path<Uuid>,
    Extension(user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    let is_own = customer_id.to_string() == user.id;
    if !is_own && !is_clinic_side(&user) {
        return Err(AppError::Auth("Not authorized to view these bookings".to_string()));
    }

    let ledger = BookingLedgerService::new(Arc::clone(&state.store));
    let bookings = ledger.bookings_for_customer(customer_id).await;

    Ok(Json(json!({ "data": bookings })))
}

#[axum::debug_handler]
pub async fn get_doctor_bookings(
    State(state): State<Arc<AppState>>,
    Path(doctor_id): Path<Uuid>,
    Extension(user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    let is_own = doctor_id.to_string() == user.id;
    if !is_own && !is_clinic_side(&user) {
        return Err(AppError::Auth("Not authorized to view these bookings".to_string()));
    }

    let ledger = BookingLedgerService::new(Arc::clone(&state.store));
    let bookings = ledger.bookings_for_doctor(doctor_id).await;

    Ok(Json(json!({ "data": bookings })))
}

#[axum::debug_handler]
pub async fn update_booking_status(
    State(state): State<Arc<AppState>>,
    Path(booking_id): Path<Uuid>,
    Extension(user): Extension<User>,
    Json(request): Json<UpdateBookingStatusRequest>,
) -> Result<Json<Value>, AppError> {
    // Confirming and completing appointments is a clinic-side action.
    let is_doctor = user.role.as_deref() == Some("doctor");
    if !is_doctor && !is_clinic_side(&user) {
        return Err(AppError::Auth("Not authorized to update booking status".to_string()));
    }

    let ledger = BookingLedgerService::new(Arc::clone(&state.store));
    let booking = ledger
        .update_status(booking_id, request.status)
        .await
        .map_err(map_booking_error)?;

    Ok(Json(json!({
        "success": true,
        "booking": booking,
        "message": "Booking status updated successfully"
    })))
}

#[axum::debug_handler]
pub async fn cancel_booking(
    State(state): State<Arc<AppState>>,
    Path(booking_id): Path<Uuid>,
    Extension(user): Extension<User>,
    Json(request): Json<CancelBookingRequest>,
) -> Result<Json<Value>, AppError> {
    let ledger = BookingLedgerService::new(Arc::clone(&state.store));

    let booking = ledger
        .get_booking(booking_id)
        .await
        .map_err(map_booking_error)?;

    let is_customer = booking.customer_id.to_string() == user.id;
    if !is_customer && !is_clinic_side(&user) {
        return Err(AppError::Auth("Not authorized to cancel this booking".to_string()));
    }

    let booking = ledger
        .cancel(booking_id, request.reason)
        .await
        .map_err(map_booking_error)?;

    Ok(Json(json!({
        "success": true,
        "booking": booking,
        "message": "Booking cancelled successfully"
    })))
}
