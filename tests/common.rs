use salon_backend::{
    api::router::create_router,
    state::AppState,
    config::Config,
    infra::repositories::{
        sqlite_booking_repo::SqliteBookingRepo,
        sqlite_service_repo::SqliteServiceRepo,
        sqlite_settings_repo::SqliteSettingsRepo,
        sqlite_waitlist_repo::SqliteWaitlistRepo,
    },
    domain::models::booking::Booking,
    domain::models::calendar::ExternalEvent,
    domain::ports::{CalendarService, Notifier, WaitlistMatchNotice},
    domain::services::availability::AvailabilityService,
    domain::services::slot_cache::SlotCache,
    domain::services::waitlist_matcher::WaitlistMatcher,
    background::start_background_worker,
    error::AppError,
};
use sqlx::{sqlite::{SqliteConnectOptions, SqlitePoolOptions}, Pool, Sqlite};
use std::str::FromStr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use uuid::Uuid;
use axum::{
    body::Body,
    http::Request,
    Router,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use serde_json::{json, Value};
use tower::ServiceExt;

/// Records every notification instead of mailing it. Flipping `fail_sends`
/// makes waitlist sends error, for the send-first transition tests.
#[derive(Default)]
pub struct MockNotifier {
    pub fail_sends: AtomicBool,
    pub waitlist_notices: Mutex<Vec<WaitlistMatchNotice>>,
    pub confirmed_booking_ids: Mutex<Vec<String>>,
    pub cancelled_booking_ids: Mutex<Vec<String>>,
}

#[async_trait]
impl Notifier for MockNotifier {
    async fn waitlist_match(&self, notice: &WaitlistMatchNotice) -> Result<(), AppError> {
        if self.fail_sends.load(Ordering::SeqCst) {
            return Err(AppError::Upstream("mock mail outage".to_string()));
        }
        self.waitlist_notices.lock().unwrap().push(notice.clone());
        Ok(())
    }

    async fn booking_confirmed(&self, booking: &Booking, _service_name: &str, _manage_link: &str) -> Result<(), AppError> {
        self.confirmed_booking_ids.lock().unwrap().push(booking.id.clone());
        Ok(())
    }

    async fn booking_cancelled(&self, booking: &Booking, _service_name: &str) -> Result<(), AppError> {
        self.cancelled_booking_ids.lock().unwrap().push(booking.id.clone());
        Ok(())
    }
}

/// In-memory calendar. Tests program `events` directly; `fail` makes every
/// call error, for the degrade-open tests.
#[derive(Default)]
pub struct MockCalendarService {
    pub fail: AtomicBool,
    pub events: Mutex<Vec<ExternalEvent>>,
    pub created_event_ids: Mutex<Vec<String>>,
    pub deleted_event_ids: Mutex<Vec<String>>,
}

impl MockCalendarService {
    pub fn set_events(&self, events: Vec<ExternalEvent>) {
        *self.events.lock().unwrap() = events;
    }
}

#[async_trait]
impl CalendarService for MockCalendarService {
    fn is_connected(&self) -> bool {
        true
    }

    async fn events_between(&self, _start: DateTime<Utc>, _end: DateTime<Utc>) -> Result<Vec<ExternalEvent>, AppError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(AppError::Upstream("calendar unreachable".to_string()));
        }
        Ok(self.events.lock().unwrap().clone())
    }

    async fn create_event(&self, booking: &Booking, _service_name: &str, _tz: Tz) -> Result<Option<String>, AppError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(AppError::Upstream("calendar unreachable".to_string()));
        }
        let event_id = format!("evt-{}", booking.id);
        self.created_event_ids.lock().unwrap().push(event_id.clone());
        Ok(Some(event_id))
    }

    async fn update_event(&self, _event_id: &str, _booking: &Booking, _service_name: &str, _tz: Tz) -> Result<(), AppError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(AppError::Upstream("calendar unreachable".to_string()));
        }
        Ok(())
    }

    async fn delete_event(&self, event_id: &str) -> Result<(), AppError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(AppError::Upstream("calendar unreachable".to_string()));
        }
        self.deleted_event_ids.lock().unwrap().push(event_id.to_string());
        Ok(())
    }
}

#[allow(dead_code)]
pub struct TestApp {
    pub router: Router,
    pub pool: Pool<Sqlite>,
    pub db_filename: String,
    pub state: Arc<AppState>,
    pub notifier: Arc<MockNotifier>,
    pub calendar: Arc<MockCalendarService>,
}

#[allow(dead_code)]
impl TestApp {
    pub async fn new() -> Self {
        let db_filename = format!("test_{}.db", Uuid::new_v4());
        let db_url = format!("sqlite://{}?mode=rwc", db_filename);

        let connection_options = SqliteConnectOptions::from_str(&db_url)
            .unwrap()
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .connect_with(connection_options)
            .await
            .expect("Failed to connect to test db");

        sqlx::migrate!("./migrations/sqlite")
            .run(&pool)
            .await
            .expect("Failed to migrate test db");

        let config = Config {
            database_url: db_url.clone(),
            port: 0,
            frontend_url: "http://localhost:5173".to_string(),
            mail_service_url: "http://localhost".to_string(),
            mail_service_token: "token".to_string(),
            google_calendar_id: None,
            google_api_token: None,
            google_api_base: "http://localhost".to_string(),
        };

        let notifier = Arc::new(MockNotifier::default());
        let calendar = Arc::new(MockCalendarService::default());

        let service_repo = Arc::new(SqliteServiceRepo::new(pool.clone()));
        let booking_repo = Arc::new(SqliteBookingRepo::new(pool.clone()));
        let waitlist_repo = Arc::new(SqliteWaitlistRepo::new(pool.clone()));
        let settings_repo = Arc::new(SqliteSettingsRepo::new(pool.clone()));

        let availability = Arc::new(AvailabilityService::new(
            settings_repo.clone(),
            booking_repo.clone(),
            calendar.clone(),
            Arc::new(SlotCache::new()),
        ));
        let matcher = Arc::new(WaitlistMatcher::new(
            waitlist_repo.clone(),
            service_repo.clone(),
            settings_repo.clone(),
            availability.clone(),
            notifier.clone(),
            config.frontend_url.clone(),
        ));

        let state = Arc::new(AppState {
            config,
            service_repo,
            booking_repo,
            waitlist_repo,
            settings_repo,
            calendar: calendar.clone(),
            notifier: notifier.clone(),
            availability,
            matcher,
        });

        let router = create_router(state.clone());

        Self {
            router,
            pool,
            db_filename,
            state,
            notifier,
            calendar,
        }
    }

    /// Scans in most tests go through the cron endpoint so the outcome
    /// counts stay exact; only the worker test starts the periodic loop.
    pub fn spawn_worker(&self) {
        let worker_state = self.state.clone();
        tokio::spawn(async move {
            start_background_worker(worker_state).await;
        });
    }

    async fn request_json(&self, method: &str, uri: &str, body: Option<Value>) -> (axum::http::StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri)
            .header("Content-Type", "application/json");
        let request = match body {
            Some(value) => builder.body(Body::from(value.to_string())).unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    /// Opens every weekday with the same window.
    pub async fn set_week_hours(&self, open: &str, close: &str) {
        let rules: Vec<Value> = (0..7)
            .map(|d| json!({"weekday": d, "is_open": true, "open_time": open, "close_time": close}))
            .collect();
        let (status, _) = self.request_json("PUT", "/api/v1/settings/hours", Some(Value::Array(rules))).await;
        assert!(status.is_success(), "Updating hours failed: {}", status);
    }

    /// Opens exactly one weekday (0 = Sunday .. 6 = Saturday); the rest close.
    pub async fn set_single_open_day(&self, weekday: i32, open: &str, close: &str) {
        let rules: Vec<Value> = (0..7)
            .map(|d| json!({"weekday": d, "is_open": d == weekday, "open_time": open, "close_time": close}))
            .collect();
        let (status, _) = self.request_json("PUT", "/api/v1/settings/hours", Some(Value::Array(rules))).await;
        assert!(status.is_success(), "Updating hours failed: {}", status);
    }

    pub async fn update_settings(&self, timezone: &str, buffer_min: i32, floor: Option<&str>, waitlist_enabled: bool) {
        let payload = json!({
            "timezone": timezone,
            "buffer_min": buffer_min,
            "booking_floor_date": floor,
            "waitlist_enabled": waitlist_enabled
        });
        let (status, _) = self.request_json("PUT", "/api/v1/settings", Some(payload)).await;
        assert!(status.is_success(), "Updating settings failed: {}", status);
    }

    pub async fn create_service(&self, name: &str, duration_min: i32) -> String {
        let payload = json!({"name": name, "duration_min": duration_min, "price_cents": 4500});
        let (status, body) = self.request_json("POST", "/api/v1/services", Some(payload)).await;
        assert!(status.is_success(), "Creating service failed: {}", status);
        body["id"].as_str().unwrap().to_string()
    }

    pub async fn create_booking(&self, service_id: &str, date: &str, time: &str) -> Value {
        let payload = json!({
            "service_id": service_id,
            "date": date,
            "time": time,
            "name": "Test Customer",
            "email": "customer@example.com"
        });
        let (status, body) = self.request_json("POST", "/api/v1/bookings", Some(payload)).await;
        assert!(status.is_success(), "Creating booking failed: {} {}", status, body);
        body
    }

    pub async fn slots_on(&self, date: &str, duration_min: i32) -> Vec<String> {
        let uri = format!(
            "/api/v1/availability?startDate={}&endDate={}&serviceDuration={}",
            date, date, duration_min
        );
        let (status, body) = self.request_json("GET", &uri, None).await;
        assert!(status.is_success(), "Availability query failed: {}", status);
        body["availableSlots"].as_array().unwrap()
            .iter()
            .map(|s| s.as_str().unwrap().to_string())
            .collect()
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.db_filename);
    }
}
