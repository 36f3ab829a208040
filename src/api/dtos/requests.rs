use serde::Deserialize;

#[derive(Deserialize)]
pub struct CreateServiceRequest {
    pub name: String,
    pub description: Option<String>,
    pub duration_min: i32,
    pub price_cents: i32,
}

#[derive(Deserialize)]
pub struct UpdateServiceRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub duration_min: Option<i32>,
    pub price_cents: Option<i32>,
    pub active: Option<bool>,
}

#[derive(Deserialize)]
pub struct ListServicesQuery {
    pub all: Option<bool>,
}

/// The booking page sends camelCase here; this is the one surface where the
/// wire names differ from the rest of the API.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityQuery {
    pub start_date: String,
    pub end_date: String,
    pub service_duration: i32,
}

#[derive(Deserialize)]
pub struct CreateBookingRequest {
    pub service_id: String,
    pub date: String,
    pub time: String,
    pub name: String,
    pub email: String,
    pub notes: Option<String>,
    pub waitlist_request_id: Option<String>,
}

#[derive(Deserialize)]
pub struct RescheduleBookingRequest {
    pub date: String,
    pub time: String,
}

#[derive(Deserialize)]
pub struct CreateWaitlistRequest {
    pub service_id: String,
    pub name: String,
    pub email: String,
    pub start_date: String,
    pub end_date: String,
}

#[derive(Deserialize)]
pub struct UpdateSettingsRequest {
    pub timezone: String,
    pub buffer_min: i32,
    pub booking_floor_date: Option<String>,
    pub waitlist_enabled: bool,
}

#[derive(Deserialize)]
pub struct HourRuleRequest {
    pub weekday: i32,
    pub is_open: bool,
    pub open_time: String,
    pub close_time: String,
}
