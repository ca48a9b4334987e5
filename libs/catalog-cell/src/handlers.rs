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

use crate::models::{CatalogError, CreateServiceRequest, UpdateServiceRequest};
use crate::services::catalog::CatalogService;

fn can_manage_catalog(user: &User) -> bool {
    matches!(
        user.role.as_deref(),
        Some("staff") | Some("manager") | Some("admin")
    )
}

fn map_catalog_error(error: CatalogError) -> AppError {
    match error {
        CatalogError::NotFound => AppError::NotFound("Service not found".to_string()),
        CatalogError::ValidationError(msg) => AppError::BadRequest(msg),
    }
}

#[axum::debug_handler]
pub async fn create_service(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    Json(request): Json<CreateServiceRequest>,
) -> Result<Json<Value>, AppError> {
    if !can_manage_catalog(&user) {
        return Err(AppError::Auth("Not authorized to manage services".to_string()));
    }

    let catalog = CatalogService::new(Arc::clone(&state.store));
    let service = catalog
        .create_service(request)
        .await
        .map_err(map_catalog_error)?;

    Ok(Json(json!({
        "success": true,
        "service": service,
        "message": "Service created successfully"
    })))
}

#[axum::debug_handler]
pub async fn update_service(
    State(state): State<Arc<AppState>>,
    Path(service_id): Path<Uuid>,
    Extension(user): Extension<User>,
    Json(request): Json<UpdateServiceRequest>,
) -> Result<Json<Value>, AppError> {
    if !can_manage_catalog(&user) {
        return Err(AppError::Auth("Not authorized to manage services".to_string()));
    }

    let catalog = CatalogService::new(Arc::clone(&state.store));
    let service = catalog
        .update_service(service_id, request)
        .await
        .map_err(map_catalog_error)?;

    Ok(Json(json!({
        "success": true,
        "service": service,
        "message": "Service updated successfully"
    })))
}

#[axum::debug_handler]
pub async fn get_service(
    State(state): State<Arc<AppState>>,
    Path(service_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let catalog = CatalogService::new(Arc::clone(&state.store));
    let service = catalog
        .get_service(service_id)
        .await
        .map_err(map_catalog_error)?;

    Ok(Json(json!(service)))
}

#[axum::debug_handler]
pub async fn list_services(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Value>, AppError> {
    let catalog = CatalogService::new(Arc::clone(&state.store));
    let services = catalog.list_services().await;

    Ok(Json(json!({ "data": services })))
}
