use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info};
use uuid::Uuid;

use shared_store::ClinicStore;

use crate::models::{CatalogError, CreateServiceRequest, TreatmentService, UpdateServiceRequest};

pub struct CatalogService {
    store: Arc<ClinicStore>,
}

impl CatalogService {
    pub fn new(store: Arc<ClinicStore>) -> Self {
        Self { store }
    }

    pub async fn create_service(
        &self,
        request: CreateServiceRequest,
    ) -> Result<TreatmentService, CatalogError> {
        if request.name.trim().is_empty() {
            return Err(CatalogError::ValidationError(
                "Service name must not be empty".to_string(),
            ));
        }
        if request.price <= 0 {
            return Err(CatalogError::ValidationError(
                "Service price must be positive".to_string(),
            ));
        }

        let now = Utc::now();
        let service = TreatmentService {
            id: Uuid::new_v4(),
            name: request.name.trim().to_string(),
            description: request.description,
            price: request.price,
            is_active: true,
            created_at: now,
            updated_at: now,
        };

        let service = self.store.insert_service(service).await;
        info!("Treatment service {} created: {}", service.id, service.name);
        Ok(service)
    }

    pub async fn update_service(
        &self,
        service_id: Uuid,
        request: UpdateServiceRequest,
    ) -> Result<TreatmentService, CatalogError> {
        debug!("Updating treatment service {}", service_id);

        let mut service = self
            .store
            .service(service_id)
            .await
            .ok_or(CatalogError::NotFound)?;

        if let Some(name) = request.name {
            if name.trim().is_empty() {
                return Err(CatalogError::ValidationError(
                    "Service name must not be empty".to_string(),
                ));
            }
            service.name = name.trim().to_string();
        }
        if let Some(description) = request.description {
            service.description = Some(description);
        }
        if let Some(price) = request.price {
            if price <= 0 {
                return Err(CatalogError::ValidationError(
                    "Service price must be positive".to_string(),
                ));
            }
            service.price = price;
        }
        if let Some(is_active) = request.is_active {
            service.is_active = is_active;
        }
        service.updated_at = Utc::now();

        Ok(self.store.insert_service(service).await)
    }

    pub async fn get_service(&self, service_id: Uuid) -> Result<TreatmentService, CatalogError> {
        self.store
            .service(service_id)
            .await
            .ok_or(CatalogError::NotFound)
    }

    pub async fn list_services(&self) -> Vec<TreatmentService> {
        self.store.services().await
    }
}
