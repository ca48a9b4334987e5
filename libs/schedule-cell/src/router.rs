use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};

use shared_store::AppState;
use shared_utils::extractor::auth_middleware;

use crate::handlers;

pub fn work_schedule_routes(state: Arc<AppState>) -> Router {
    let protected_routes = Router::new()
        .route("/", get(handlers::list_work_schedules))
        .route("/create", post(handlers::create_work_schedule))
        .route("/{schedule_id}", put(handlers::update_work_schedule))
        .route("/doctor/{doctor_id}", get(handlers::get_doctor_work_schedules))
        .route("/doctor/{doctor_id}/slots", get(handlers::get_available_slots))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new().merge(protected_routes).with_state(state)
}
