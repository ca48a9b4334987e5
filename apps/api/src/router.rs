use std::sync::Arc;

use axum::{routing::get, Router};

use booking_cell::router::booking_routes;
use catalog_cell::router::catalog_routes;
use invoice_cell::router::invoice_routes;
use payment_cell::router::payment_routes;
use schedule_cell::router::work_schedule_routes;
use shared_store::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(|| async { "FertiCare booking API is running!" }))
        .nest("/work-schedules", work_schedule_routes(state.clone()))
        .nest("/bookings", booking_routes(state.clone()))
        .nest("/invoices", invoice_routes(state.clone()))
        .nest("/payments", payment_routes(state.clone()))
        .nest("/services", catalog_routes(state))
}
