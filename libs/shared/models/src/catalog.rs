use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A treatment offered by the clinic. Prices are integer VND amounts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreatmentService {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub price: i64,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
