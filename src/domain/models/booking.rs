use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use sqlx::FromRow;
use rand::{distributions::Alphanumeric, Rng};

/// An appointment. Date and start time are wall-clock values in the business
/// timezone; conversion to instants happens only at the calendar boundary.
#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct Booking {
    pub id: String,
    pub service_id: String,
    pub customer_name: String,
    pub customer_email: String,
    pub customer_note: Option<String>,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub duration_min: i32,
    pub status: String,
    pub manage_token: String,
    pub calendar_event_id: Option<String>,
    pub waitlist_request_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

pub struct NewBookingParams {
    pub service_id: String,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub duration_min: i32,
    pub name: String,
    pub email: String,
    pub note: Option<String>,
    pub waitlist_request_id: Option<String>,
}

impl Booking {
    pub fn new(params: NewBookingParams) -> Self {
        let token: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(48)
            .map(char::from)
            .collect();

        Self {
            id: Uuid::new_v4().to_string(),
            service_id: params.service_id,
            customer_name: params.name,
            customer_email: params.email,
            customer_note: params.note,
            date: params.date,
            start_time: params.start_time,
            duration_min: params.duration_min,
            status: "CONFIRMED".to_string(),
            manage_token: token,
            calendar_event_id: None,
            waitlist_request_id: params.waitlist_request_id,
            created_at: Utc::now(),
        }
    }

    pub fn end_time(&self) -> NaiveTime {
        self.start_time + chrono::Duration::minutes(self.duration_min as i64)
    }
}
