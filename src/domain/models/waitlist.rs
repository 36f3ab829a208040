use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::FromRow;

/// Waitlist lifecycle: PENDING -> NOTIFIED (matcher found a slot and the
/// notification was delivered), NOTIFIED -> CONVERTED (customer booked via
/// the notified link), NOTIFIED -> EXPIRED (48h window ran out),
/// PENDING | NOTIFIED -> CANCELLED (customer withdrew).
#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct WaitlistRequest {
    pub id: String,
    pub service_id: String,
    pub customer_name: String,
    pub customer_email: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub status: String,
    pub notified_at: Option<DateTime<Utc>>,
    pub expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl WaitlistRequest {
    pub fn new(
        service_id: String,
        name: String,
        email: String,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            service_id,
            customer_name: name,
            customer_email: email,
            start_date,
            end_date,
            status: "PENDING".to_string(),
            notified_at: None,
            expires_at: None,
            created_at: Utc::now(),
        }
    }
}
