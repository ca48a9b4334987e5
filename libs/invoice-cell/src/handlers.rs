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

use crate::models::{CreateInvoiceRequest, InvoiceError};
use crate::services::invoice::InvoiceGeneratorService;

fn is_clinic_side(user: &User) -> bool {
    matches!(
        user.role.as_deref(),
        Some("staff") | Some("manager") | Some("admin")
    )
}

fn map_invoice_error(error: InvoiceError) -> AppError {
    match error {
        InvoiceError::BookingNotFound => AppError::NotFound("Booking not found".to_string()),
        InvoiceError::NotFound => AppError::NotFound("Invoice not found".to_string()),
        InvoiceError::BookingCancelled => {
            AppError::BadRequest("Cancelled bookings cannot be invoiced".to_string())
        }
        InvoiceError::AlreadyPaid => {
            AppError::Conflict("Invoice is already paid".to_string())
        }
    }
}

#[axum::debug_handler]
pub async fn create_invoice(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    Json(request): Json<CreateInvoiceRequest>,
) -> Result<Json<Value>, AppError> {
    let generator = InvoiceGeneratorService::new(Arc::clone(&state.store));

    let booking = generator
        .booking(request.booking_id)
        .await
        .map_err(map_invoice_error)?;

    let is_own_booking = booking.customer_id.to_string() == user.id;
    if !is_own_booking && !is_clinic_side(&user) {
        return Err(AppError::Auth("Not authorized to invoice this booking".to_string()));
    }

    let (invoice, created) = generator
        .create_invoice(request.booking_id)
        .await
        .map_err(map_invoice_error)?;

    Ok(Json(json!({
        "success": true,
        "invoice": invoice,
        "created": created,
        "message": if created {
            "Invoice created successfully"
        } else {
            "Booking already has an invoice"
        }
    })))
}

#[axum::debug_handler]
pub async fn get_invoice(
    State(state): State<Arc<AppState>>,
    Path(invoice_id): Path<Uuid>,
    Extension(user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    let generator = InvoiceGeneratorService::new(Arc::clone(&state.store));
    let invoice = generator
        .get_invoice(invoice_id)
        .await
        .map_err(map_invoice_error)?;

    let is_owner = invoice.customer_id.to_string() == user.id;
    if !is_owner && !is_clinic_side(&user) {
        return Err(AppError::Auth("Not authorized to view this invoice".to_string()));
    }

    Ok(Json(json!(invoice)))
}

#[axum::debug_handler]
pub async fn get_invoice_by_booking(
    State(state): State<Arc<AppState>>,
    Path(booking_id): Path<Uuid>,
    Extension(user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    let generator = InvoiceGeneratorService::new(Arc::clone(&state.store));
    let invoice = generator
        .invoice_for_booking(booking_id)
        .await
        .map_err(map_invoice_error)?;

    let is_owner = invoice.customer_id.to_string() == user.id;
    if !is_owner && !is_clinic_side(&user) {
        return Err(AppError::Auth("Not authorized to view this invoice".to_string()));
    }

    Ok(Json(json!(invoice)))
}

#[axum::debug_handler]
pub async fn get_user_invoices(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<Uuid>,
    Extension(user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    let is_own = user_id.to_string() == user.id;
    if !is_own && !is_clinic_side(&user) {
        return Err(AppError::Auth("Not authorized to view these invoices".to_string()));
    }

    let generator = InvoiceGeneratorService::new(Arc::clone(&state.store));
    let invoices = generator.invoices_for_customer(user_id).await;

    Ok(Json(json!({ "data": invoices })))
}

#[axum::debug_handler]
pub async fn cancel_invoice(
    State(state): State<Arc<AppState>>,
    Path(invoice_id): Path<Uuid>,
    Extension(user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    let generator = InvoiceGeneratorService::new(Arc::clone(&state.store));

    let invoice = generator
        .get_invoice(invoice_id)
        .await
        .map_err(map_invoice_error)?;

    let is_owner = invoice.customer_id.to_string() == user.id;
    if !is_owner && !is_clinic_side(&user) {
        return Err(AppError::Auth("Not authorized to cancel this invoice".to_string()));
    }

    let invoice = generator
        .cancel_invoice(invoice_id)
        .await
        .map_err(map_invoice_error)?;

    Ok(Json(json!({
        "success": true,
        "invoice": invoice,
        "message": "Invoice cancelled successfully"
    })))
}
