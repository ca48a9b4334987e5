use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, patch, post},
    Router,
};

use shared_store::AppState;
use shared_utils::extractor::auth_middleware;

use crate::handlers;

pub fn booking_routes(state: Arc<AppState>) -> Router {
    // All booking operations require authentication
    let protected_routes = Router::new()
        .route("/form", post(handlers::reserve_booking))
        .route("/{booking_id}", get(handlers::get_booking))
        .route("/{booking_id}/status", patch(handlers::update_booking_status))
        .route("/{booking_id}/cancel", post(handlers::cancel_booking))
        .route("/customer/{customer_id}", get(handlers::get_customer_bookings))
        .route("/doctor/{doctor_id}", get(handlers::get_doctor_bookings))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new().merge(protected_routes).with_state(state)
}
