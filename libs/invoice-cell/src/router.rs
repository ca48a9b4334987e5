use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use shared_store::AppState;
use shared_utils::extractor::auth_middleware;

use crate::handlers;

pub fn invoice_routes(state: Arc<AppState>) -> Router {
    let protected_routes = Router::new()
        .route("/create", post(handlers::create_invoice))
        .route("/{invoice_id}", get(handlers::get_invoice))
        .route("/{invoice_id}/cancel", post(handlers::cancel_invoice))
        .route("/booking/{booking_id}", get(handlers::get_invoice_by_booking))
        .route("/user/{user_id}", get(handlers::get_user_invoices))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new().merge(protected_routes).with_state(state)
}
