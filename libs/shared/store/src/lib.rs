pub mod memory;

pub use memory::{ClinicStore, StoreError};

use std::sync::Arc;

use shared_config::AppConfig;

/// Shared application state handed to every router. The store is the only
/// shared mutable resource in the system; everything else is derived.
pub struct AppState {
    pub config: AppConfig,
    pub store: Arc<ClinicStore>,
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        Self {
            config,
            store: Arc::new(ClinicStore::default()),
        }
    }
}
