use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::{routing::get, Router};
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

use booking_cell::router::booking_routes;
use catalog_cell::router::catalog_routes;
use invoice_cell::router::invoice_routes;
use payment_cell::router::payment_routes;
use schedule_cell::router::work_schedule_routes;
use shared_store::AppState;
use shared_utils::test_utils::{issue_test_token, test_state};

/// Same composition as the api binary's router.
fn app(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(|| async { "FertiCare booking API is running!" }))
        .nest("/work-schedules", work_schedule_routes(state.clone()))
        .nest("/bookings", booking_routes(state.clone()))
        .nest("/invoices", invoice_routes(state.clone()))
        .nest("/payments", payment_routes(state.clone()))
        .nest("/services", catalog_routes(state))
}

async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("Authorization", format!("Bearer {}", token));
    }

    let request = match body {
        Some(json_body) => builder
            .header("content-type", "application/json")
            .body(Body::from(json_body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::String(
            String::from_utf8_lossy(&bytes).into_owned(),
        ))
    };
    (status, value)
}

#[tokio::test]
async fn root_endpoint_is_public() {
    let app = app(test_state());
    let (status, _) = send(&app, "GET", "/", None, None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn protected_routes_require_a_valid_token() {
    let app = app(test_state());

    let (status, _) = send(&app, "GET", "/services", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(&app, "GET", "/services", Some("not-a-token"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn customers_cannot_manage_schedules_or_services() {
    let app = app(test_state());
    let customer = issue_test_token(&Uuid::new_v4().to_string(), "customer");

    let (status, _) = send(
        &app,
        "POST",
        "/services/create",
        Some(&customer),
        Some(json!({ "name": "IVF cycle", "price": 90000000 })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(
        &app,
        "POST",
        "/work-schedules/create",
        Some(&customer),
        Some(json!({
            "doctor_id": Uuid::new_v4(),
            "start_time": "2024-07-01T09:00:00Z",
            "end_time": "2024-07-01T10:00:00Z"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn booking_to_payment_flow_end_to_end() {
    let app = app(test_state());

    let staff = issue_test_token(&Uuid::new_v4().to_string(), "staff");
    let doctor_id = Uuid::new_v4();
    let customer_id = Uuid::new_v4();
    let customer = issue_test_token(&customer_id.to_string(), "customer");
    let rival = issue_test_token(&Uuid::new_v4().to_string(), "customer");

    // Staff publish the catalog and the doctor's schedule.
    let (status, body) = send(
        &app,
        "POST",
        "/services/create",
        Some(&staff),
        Some(json!({ "name": "Initial consultation", "price": 500000 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let service_id = body["service"]["id"].as_str().unwrap().to_string();

    let (status, _) = send(
        &app,
        "POST",
        "/work-schedules/create",
        Some(&staff),
        Some(json!({
            "doctor_id": doctor_id,
            "start_time": "2024-07-01T09:00:00Z",
            "end_time": "2024-07-01T10:00:00Z"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    // The window exposes exactly two slots.
    let (status, body) = send(
        &app,
        "GET",
        &format!("/work-schedules/doctor/{}/slots?from=2024-07-01&to=2024-07-01", doctor_id),
        Some(&customer),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 2);

    // Customer reserves 09:00.
    let (status, body) = send(
        &app,
        "POST",
        "/bookings/form",
        Some(&customer),
        Some(json!({
            "customer_id": customer_id,
            "doctor_id": doctor_id,
            "service_id": service_id,
            "date": "2024-07-01",
            "time": "09:00:00",
            "notes": "First visit"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let booking_id = body["booking"]["id"].as_str().unwrap().to_string();

    // A rival's reserve of the same slot is a conflict.
    let (status, body) = send(
        &app,
        "POST",
        "/bookings/form",
        Some(&rival),
        Some(json!({
            "customer_id": body["booking"]["customer_id"],
            "doctor_id": doctor_id,
            "service_id": service_id,
            "date": "2024-07-01",
            "time": "09:00:00"
        })),
    )
    .await;
    // Reserving on behalf of another customer is refused before the slot
    // check even runs.
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body["error"].is_string());

    let rival_id = Uuid::new_v4();
    let rival = issue_test_token(&rival_id.to_string(), "customer");
    let (status, _) = send(
        &app,
        "POST",
        "/bookings/form",
        Some(&rival),
        Some(json!({
            "customer_id": rival_id,
            "doctor_id": doctor_id,
            "service_id": service_id,
            "date": "2024-07-01",
            "time": "09:00:00"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    // Only 09:30 remains bookable.
    let (_, body) = send(
        &app,
        "GET",
        &format!("/work-schedules/doctor/{}/slots?from=2024-07-01&to=2024-07-01", doctor_id),
        Some(&customer),
        None,
    )
    .await;
    let slots = body["data"].as_array().unwrap();
    assert_eq!(slots.len(), 1);
    assert_eq!(slots[0]["start_time"], "09:30:00");

    // Invoice the booking; a repeat call returns the same invoice.
    let (status, body) = send(
        &app,
        "POST",
        "/invoices/create",
        Some(&customer),
        Some(json!({ "booking_id": booking_id })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["created"], true);
    assert_eq!(body["invoice"]["total_amount"], 500000);
    let invoice_id = body["invoice"]["id"].as_str().unwrap().to_string();

    let (status, body) = send(
        &app,
        "POST",
        "/invoices/create",
        Some(&customer),
        Some(json!({ "booking_id": booking_id })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["created"], false);
    assert_eq!(body["invoice"]["id"].as_str().unwrap(), invoice_id);

    // The QR payload advertises the configured bank account.
    let (status, body) = send(
        &app,
        "GET",
        &format!("/payments/qr/{}", invoice_id),
        Some(&customer),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["account_number"], "0011002233445");

    // Settle the invoice in full.
    let (status, body) = send(
        &app,
        "POST",
        "/payments",
        Some(&customer),
        Some(json!({ "invoice_id": invoice_id, "amount": 500000, "method": "BANKING" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["invoice"]["status"], "paid");

    // Paid invoices refuse further charges and QR regeneration.
    let (status, _) = send(
        &app,
        "POST",
        "/payments",
        Some(&customer),
        Some(json!({ "invoice_id": invoice_id, "amount": 1, "method": "BANKING" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = send(
        &app,
        "GET",
        &format!("/payments/qr/{}", invoice_id),
        Some(&customer),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    // The payment history shows the single settling payment.
    let (status, body) = send(
        &app,
        "GET",
        &format!("/payments/invoice/{}", invoice_id),
        Some(&staff),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn cancelling_a_booking_frees_its_slot() {
    let app = app(test_state());

    let staff = issue_test_token(&Uuid::new_v4().to_string(), "staff");
    let doctor_id = Uuid::new_v4();
    let customer_id = Uuid::new_v4();
    let customer = issue_test_token(&customer_id.to_string(), "customer");

    let (_, body) = send(
        &app,
        "POST",
        "/services/create",
        Some(&staff),
        Some(json!({ "name": "Follow-up", "price": 300000 })),
    )
    .await;
    let service_id = body["service"]["id"].as_str().unwrap().to_string();

    send(
        &app,
        "POST",
        "/work-schedules/create",
        Some(&staff),
        Some(json!({
            "doctor_id": doctor_id,
            "start_time": "2024-07-01T09:00:00Z",
            "end_time": "2024-07-01T09:30:00Z"
        })),
    )
    .await;

    let (_, body) = send(
        &app,
        "POST",
        "/bookings/form",
        Some(&customer),
        Some(json!({
            "customer_id": customer_id,
            "doctor_id": doctor_id,
            "service_id": service_id,
            "date": "2024-07-01",
            "time": "09:00:00"
        })),
    )
    .await;
    let booking_id = body["booking"]["id"].as_str().unwrap().to_string();

    let slots_uri =
        format!("/work-schedules/doctor/{}/slots?from=2024-07-01&to=2024-07-01", doctor_id);
    let (_, body) = send(&app, "GET", &slots_uri, Some(&customer), None).await;
    assert!(body["data"].as_array().unwrap().is_empty());

    let (status, _) = send(
        &app,
        "POST",
        &format!("/bookings/{}/cancel", booking_id),
        Some(&customer),
        Some(json!({ "reason": "schedule change" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = send(&app, "GET", &slots_uri, Some(&customer), None).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
}
