//! Shared helpers for cell and endpoint tests.

use std::sync::Arc;

use chrono::Utc;
use serde_json::json;

use shared_config::AppConfig;
use shared_models::auth::User;
use shared_store::AppState;

use crate::jwt::sign_token;

pub const TEST_JWT_SECRET: &str = "test-jwt-secret";

/// Application state wired for tests: a fixed JWT secret, demo bank
/// details, and an empty store.
pub fn test_state() -> Arc<AppState> {
    let config = AppConfig {
        jwt_secret: TEST_JWT_SECRET.to_string(),
        bank_name: "Vietcombank".to_string(),
        bank_account_number: "0011002233445".to_string(),
        bank_account_holder: "FertiCare Clinic".to_string(),
    };
    Arc::new(AppState::new(config))
}

pub fn test_user(id: &str, role: &str) -> User {
    User {
        id: id.to_string(),
        email: Some(format!("{}@example.com", role)),
        role: Some(role.to_string()),
        created_at: Some(Utc::now()),
    }
}

/// Mint a valid bearer token for the given user id and role.
pub fn issue_test_token(user_id: &str, role: &str) -> String {
    let claims = json!({
        "sub": user_id,
        "email": format!("{}@example.com", role),
        "role": role,
        "iat": Utc::now().timestamp(),
        "exp": Utc::now().timestamp() + 3600,
    });
    sign_token(&claims, TEST_JWT_SECRET).expect("test token signing")
}
