use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, Utc};
use sqlx::FromRow;

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct Service {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub duration_min: i32,
    pub price_cents: i32,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

impl Service {
    pub fn new(name: String, description: Option<String>, duration_min: i32, price_cents: i32) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name,
            description,
            duration_min,
            price_cents,
            active: true,
            created_at: Utc::now(),
        }
    }
}
