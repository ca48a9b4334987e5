use std::env;
use tracing::warn;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub jwt_secret: String,
    pub bank_name: String,
    pub bank_account_number: String,
    pub bank_account_holder: String,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let config = Self {
            jwt_secret: env::var("JWT_SECRET")
                .unwrap_or_else(|_| {
                    warn!("JWT_SECRET not set, using empty value");
                    String::new()
                }),
            bank_name: env::var("BANK_NAME")
                .unwrap_or_else(|_| {
                    warn!("BANK_NAME not set, using default");
                    "Vietcombank".to_string()
                }),
            bank_account_number: env::var("BANK_ACCOUNT_NUMBER")
                .unwrap_or_else(|_| {
                    warn!("BANK_ACCOUNT_NUMBER not set, using empty value");
                    String::new()
                }),
            bank_account_holder: env::var("BANK_ACCOUNT_HOLDER")
                .unwrap_or_else(|_| {
                    warn!("BANK_ACCOUNT_HOLDER not set, using default");
                    "FertiCare Clinic".to_string()
                }),
        };

        if !config.is_configured() {
            warn!("Application not fully configured - missing environment variables");
        }

        config
    }

    pub fn is_configured(&self) -> bool {
        !self.jwt_secret.is_empty()
    }

    pub fn is_banking_configured(&self) -> bool {
        !self.bank_name.is_empty() && !self.bank_account_number.is_empty()
    }
}
