use async_trait::async_trait;
use chrono::{DateTime, Utc};
use chrono_tz::Tz;

use crate::domain::models::booking::Booking;
use crate::domain::models::calendar::ExternalEvent;
use crate::domain::ports::CalendarService;
use crate::error::AppError;

/// Stand-in when no calendar is configured: no blocks, no sync. Every
/// operation succeeds so call sites stay unconditional.
pub struct NullCalendarService;

#[async_trait]
impl CalendarService for NullCalendarService {
    fn is_connected(&self) -> bool {
        false
    }

    async fn events_between(&self, _start: DateTime<Utc>, _end: DateTime<Utc>) -> Result<Vec<ExternalEvent>, AppError> {
        Ok(Vec::new())
    }

    async fn create_event(&self, _booking: &Booking, _service_name: &str, _tz: Tz) -> Result<Option<String>, AppError> {
        Ok(None)
    }

    async fn update_event(&self, _event_id: &str, _booking: &Booking, _service_name: &str, _tz: Tz) -> Result<(), AppError> {
        Ok(())
    }

    async fn delete_event(&self, _event_id: &str) -> Result<(), AppError> {
        Ok(())
    }
}
