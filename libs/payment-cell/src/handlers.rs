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

use crate::models::{PaymentError, RecordPaymentRequest};
use crate::services::payment::PaymentProcessorService;
use crate::services::qr::PaymentQrService;

fn is_clinic_side(user: &User) -> bool {
    matches!(
        user.role.as_deref(),
        Some("staff") | Some("manager") | Some("admin")
    )
}

fn map_payment_error(error: PaymentError) -> AppError {
    match error {
        PaymentError::InvoiceNotFound => AppError::NotFound("Invoice not found".to_string()),
        PaymentError::AlreadyPaid => AppError::Conflict("Invoice is already paid".to_string()),
        PaymentError::InvoiceCancelled => {
            AppError::Conflict("Invoice has been cancelled".to_string())
        }
        PaymentError::ValidationError(msg) => AppError::BadRequest(msg),
    }
}

#[axum::debug_handler]
pub async fn record_payment(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    Json(request): Json<RecordPaymentRequest>,
) -> Result<Json<Value>, AppError> {
    let processor = PaymentProcessorService::new(Arc::clone(&state.store));

    let invoice = processor
        .invoice(request.invoice_id)
        .await
        .map_err(map_payment_error)?;

    let is_owner = invoice.customer_id.to_string() == user.id;
    if !is_owner && !is_clinic_side(&user) {
        return Err(AppError::Auth("Not authorized to pay this invoice".to_string()));
    }

    let (payment, invoice) = processor
        .record_payment(request)
        .await
        .map_err(map_payment_error)?;

    Ok(Json(json!({
        "success": true,
        "payment": payment,
        "invoice": invoice,
        "message": "Payment recorded successfully"
    })))
}

#[axum::debug_handler]
pub async fn get_invoice_payments(
    State(state): State<Arc<AppState>>,
    Path(invoice_id): Path<Uuid>,
    Extension(user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    let processor = PaymentProcessorService::new(Arc::clone(&state.store));

    let invoice = processor
        .invoice(invoice_id)
        .await
        .map_err(map_payment_error)?;

    let is_owner = invoice.customer_id.to_string() == user.id;
    if !is_owner && !is_clinic_side(&user) {
        return Err(AppError::Auth("Not authorized to view these payments".to_string()));
    }

    let payments = processor
        .payments_for_invoice(invoice_id)
        .await
        .map_err(map_payment_error)?;

    Ok(Json(json!({ "data": payments })))
}

#[axum::debug_handler]
pub async fn get_payment_qr(
    State(state): State<Arc<AppState>>,
    Path(invoice_id): Path<Uuid>,
    Extension(user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    let processor = PaymentProcessorService::new(Arc::clone(&state.store));

    let invoice = processor
        .invoice(invoice_id)
        .await
        .map_err(map_payment_error)?;

    let is_owner = invoice.customer_id.to_string() == user.id;
    if !is_owner && !is_clinic_side(&user) {
        return Err(AppError::Auth("Not authorized to view this invoice".to_string()));
    }

    let qr_service = PaymentQrService::new(Arc::clone(&state.store), &state.config);
    let qr = qr_service
        .get_payment_qr(invoice_id)
        .await
        .map_err(map_payment_error)?;

    Ok(Json(json!(qr)))
}
