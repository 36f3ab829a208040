use crate::domain::models::{
    booking::Booking, calendar::ExternalEvent, service::Service,
    settings::{BusinessHourRule, BusinessSettings}, waitlist::WaitlistRequest,
};
use crate::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use chrono_tz::Tz;

#[async_trait]
pub trait ServiceRepository: Send + Sync {
    async fn create(&self, service: &Service) -> Result<Service, AppError>;
    async fn find_by_id(&self, id: &str) -> Result<Option<Service>, AppError>;
    async fn list(&self) -> Result<Vec<Service>, AppError>;
    async fn list_active(&self) -> Result<Vec<Service>, AppError>;
    async fn update(&self, service: &Service) -> Result<Service, AppError>;
    async fn delete(&self, id: &str) -> Result<(), AppError>;
}

#[async_trait]
pub trait BookingRepository: Send + Sync {
    async fn create(&self, booking: &Booking) -> Result<Booking, AppError>;
    async fn find_by_id(&self, id: &str) -> Result<Option<Booking>, AppError>;
    async fn find_by_manage_token(&self, token: &str) -> Result<Option<Booking>, AppError>;
    async fn list(&self) -> Result<Vec<Booking>, AppError>;
    /// Bookings that occupy time on the date: status CONFIRMED or PENDING.
    async fn list_active_on(&self, date: NaiveDate) -> Result<Vec<Booking>, AppError>;
    async fn reschedule(&self, id: &str, date: NaiveDate, start_time: NaiveTime) -> Result<Booking, AppError>;
    /// Conditional CONFIRMED|PENDING -> CANCELLED; false when already final.
    async fn cancel(&self, id: &str) -> Result<bool, AppError>;
    async fn set_calendar_event_id(&self, id: &str, event_id: &str) -> Result<(), AppError>;
}

#[async_trait]
pub trait WaitlistRepository: Send + Sync {
    async fn create(&self, request: &WaitlistRequest) -> Result<WaitlistRequest, AppError>;
    async fn find_by_id(&self, id: &str) -> Result<Option<WaitlistRequest>, AppError>;
    async fn list(&self) -> Result<Vec<WaitlistRequest>, AppError>;
    /// PENDING requests, oldest first. Scan order is creation order.
    async fn list_pending(&self) -> Result<Vec<WaitlistRequest>, AppError>;
    /// Conditional PENDING -> NOTIFIED; false when the row moved on already.
    async fn mark_notified(&self, id: &str, notified_at: DateTime<Utc>, expires_at: DateTime<Utc>) -> Result<bool, AppError>;
    /// Conditional NOTIFIED -> CONVERTED.
    async fn mark_converted(&self, id: &str) -> Result<bool, AppError>;
    /// Conditional PENDING|NOTIFIED -> CANCELLED.
    async fn cancel(&self, id: &str) -> Result<bool, AppError>;
    /// NOTIFIED rows whose expiry passed -> EXPIRED. Returns rows changed.
    async fn expire_overdue(&self, now: DateTime<Utc>) -> Result<u64, AppError>;
}

#[async_trait]
pub trait SettingsRepository: Send + Sync {
    async fn load(&self) -> Result<BusinessSettings, AppError>;
    async fn update_settings(&self, timezone: &str, buffer_min: i32, booking_floor_date: Option<NaiveDate>, waitlist_enabled: bool) -> Result<(), AppError>;
    async fn update_hours(&self, rules: &[BusinessHourRule]) -> Result<(), AppError>;
}

/// External calendar. Reads degrade open: a disconnected calendar yields
/// zero events, and callers treat fetch errors the same way after logging.
#[async_trait]
pub trait CalendarService: Send + Sync {
    fn is_connected(&self) -> bool;
    async fn events_between(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Vec<ExternalEvent>, AppError>;
    /// Returns the created event id, or None when disconnected.
    async fn create_event(&self, booking: &Booking, service_name: &str, tz: Tz) -> Result<Option<String>, AppError>;
    async fn update_event(&self, event_id: &str, booking: &Booking, service_name: &str, tz: Tz) -> Result<(), AppError>;
    async fn delete_event(&self, event_id: &str) -> Result<(), AppError>;
}

/// Payload for the waitlist match notification.
#[derive(Debug, Clone)]
pub struct WaitlistMatchNotice {
    pub customer_name: String,
    pub customer_email: String,
    pub service_name: String,
    pub matched_date: NaiveDate,
    pub matched_time: NaiveTime,
    pub booking_link: String,
}

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn waitlist_match(&self, notice: &WaitlistMatchNotice) -> Result<(), AppError>;
    async fn booking_confirmed(&self, booking: &Booking, service_name: &str, manage_link: &str) -> Result<(), AppError>;
    async fn booking_cancelled(&self, booking: &Booking, service_name: &str) -> Result<(), AppError>;
}
