use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use chrono_tz::Tz;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{error, warn};

use crate::domain::models::booking::Booking;
use crate::domain::models::calendar::{BOOKING_MARKER, EventTime, ExternalEvent};
use crate::domain::ports::CalendarService;
use crate::error::AppError;

/// Unreachable calendar must not hang availability queries.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Recurring events are expanded server-side; one salon day never comes
/// close to this page size.
const MAX_RESULTS: &str = "2500";

pub struct GoogleCalendarClient {
    client: Client,
    api_base: String,
    calendar_id: String,
    api_token: String,
}

impl GoogleCalendarClient {
    pub fn new(api_base: String, calendar_id: String, api_token: String) -> Self {
        Self {
            client: Client::new(),
            api_base,
            calendar_id,
            api_token,
        }
    }

    fn events_url(&self) -> String {
        format!("{}/calendars/{}/events", self.api_base, self.calendar_id)
    }

    fn event_payload(&self, booking: &Booking, service_name: &str, tz: Tz) -> GcalEventPayload {
        let start = booking.date.and_time(booking.start_time);
        let end = start + chrono::Duration::minutes(booking.duration_min as i64);
        GcalEventPayload {
            summary: format!("{}: {}", service_name, booking.customer_name),
            description: format!(
                "{} {}\nCustomer: {} ({})",
                BOOKING_MARKER, booking.id, booking.customer_name, booking.customer_email
            ),
            start: GcalTimePayload {
                date_time: start.format("%Y-%m-%dT%H:%M:%S").to_string(),
                time_zone: tz.name().to_string(),
            },
            end: GcalTimePayload {
                date_time: end.format("%Y-%m-%dT%H:%M:%S").to_string(),
                time_zone: tz.name().to_string(),
            },
            extended_properties: GcalExtendedProps {
                private: GcalPrivateProps {
                    booking_id: booking.id.clone(),
                },
            },
        }
    }
}

#[async_trait]
impl CalendarService for GoogleCalendarClient {
    fn is_connected(&self) -> bool {
        true
    }

    async fn events_between(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Vec<ExternalEvent>, AppError> {
        let res = self.client.get(self.events_url())
            .timeout(REQUEST_TIMEOUT)
            .header("Authorization", format!("Bearer {}", self.api_token))
            .query(&[
                ("timeMin", start.to_rfc3339_opts(SecondsFormat::Secs, true)),
                ("timeMax", end.to_rfc3339_opts(SecondsFormat::Secs, true)),
                ("singleEvents", "true".to_string()),
                ("maxResults", MAX_RESULTS.to_string()),
            ])
            .send()
            .await
            .map_err(|e| AppError::Upstream(format!("Calendar request failed: {}", e)))?;

        if !res.status().is_success() {
            let status = res.status();
            let text = res.text().await.unwrap_or_default();
            return Err(AppError::Upstream(format!(
                "Calendar list failed. Status: {}, Body: {}", status, text
            )));
        }

        let list: GcalEventList = res.json().await
            .map_err(|e| AppError::Upstream(format!("Calendar response unreadable: {}", e)))?;

        let mut events = Vec::new();
        for item in list.items {
            if item.status.as_deref() == Some("cancelled") {
                continue;
            }
            let Some(time) = item.event_time() else {
                warn!("Calendar event {} has no usable start/end, skipping", item.id);
                continue;
            };
            events.push(ExternalEvent {
                id: item.id,
                description: item.description,
                booking_id: item
                    .extended_properties
                    .and_then(|p| p.private)
                    .and_then(|p| p.booking_id),
                time,
            });
        }
        Ok(events)
    }

    async fn create_event(&self, booking: &Booking, service_name: &str, tz: Tz) -> Result<Option<String>, AppError> {
        let payload = self.event_payload(booking, service_name, tz);
        let res = self.client.post(self.events_url())
            .timeout(REQUEST_TIMEOUT)
            .header("Authorization", format!("Bearer {}", self.api_token))
            .json(&payload)
            .send()
            .await
            .map_err(|e| {
                let msg = format!("Calendar create failed: {}", e);
                error!("{}", msg);
                AppError::Upstream(msg)
            })?;

        if !res.status().is_success() {
            let status = res.status();
            let text = res.text().await.unwrap_or_default();
            let msg = format!("Calendar create failed. Status: {}, Body: {}", status, text);
            error!("{}", msg);
            return Err(AppError::Upstream(msg));
        }

        let created: GcalCreatedEvent = res.json().await
            .map_err(|e| AppError::Upstream(format!("Calendar response unreadable: {}", e)))?;
        Ok(Some(created.id))
    }

    async fn update_event(&self, event_id: &str, booking: &Booking, service_name: &str, tz: Tz) -> Result<(), AppError> {
        let payload = self.event_payload(booking, service_name, tz);
        let res = self.client.patch(format!("{}/{}", self.events_url(), event_id))
            .timeout(REQUEST_TIMEOUT)
            .header("Authorization", format!("Bearer {}", self.api_token))
            .json(&payload)
            .send()
            .await
            .map_err(|e| AppError::Upstream(format!("Calendar update failed: {}", e)))?;

        if !res.status().is_success() {
            let status = res.status();
            let text = res.text().await.unwrap_or_default();
            return Err(AppError::Upstream(format!(
                "Calendar update failed. Status: {}, Body: {}", status, text
            )));
        }
        Ok(())
    }

    async fn delete_event(&self, event_id: &str) -> Result<(), AppError> {
        let res = self.client.delete(format!("{}/{}", self.events_url(), event_id))
            .timeout(REQUEST_TIMEOUT)
            .header("Authorization", format!("Bearer {}", self.api_token))
            .send()
            .await
            .map_err(|e| AppError::Upstream(format!("Calendar delete failed: {}", e)))?;

        // Already gone counts as deleted.
        if !res.status().is_success() && res.status().as_u16() != 404 && res.status().as_u16() != 410 {
            let status = res.status();
            let text = res.text().await.unwrap_or_default();
            return Err(AppError::Upstream(format!(
                "Calendar delete failed. Status: {}, Body: {}", status, text
            )));
        }
        Ok(())
    }
}

#[derive(Serialize)]
struct GcalEventPayload {
    summary: String,
    description: String,
    start: GcalTimePayload,
    end: GcalTimePayload,
    #[serde(rename = "extendedProperties")]
    extended_properties: GcalExtendedProps,
}

#[derive(Serialize)]
struct GcalTimePayload {
    #[serde(rename = "dateTime")]
    date_time: String,
    #[serde(rename = "timeZone")]
    time_zone: String,
}

#[derive(Serialize)]
struct GcalExtendedProps {
    private: GcalPrivateProps,
}

#[derive(Serialize)]
struct GcalPrivateProps {
    #[serde(rename = "bookingId")]
    booking_id: String,
}

#[derive(Deserialize)]
struct GcalCreatedEvent {
    id: String,
}

#[derive(Deserialize)]
struct GcalEventList {
    #[serde(default)]
    items: Vec<GcalEventItem>,
}

#[derive(Deserialize)]
struct GcalEventItem {
    id: String,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    start: Option<GcalEventTimeIn>,
    #[serde(default)]
    end: Option<GcalEventTimeIn>,
    #[serde(rename = "extendedProperties", default)]
    extended_properties: Option<GcalExtendedPropsIn>,
}

#[derive(Deserialize)]
struct GcalEventTimeIn {
    #[serde(default)]
    date: Option<NaiveDate>,
    #[serde(rename = "dateTime", default)]
    date_time: Option<DateTime<Utc>>,
}

#[derive(Deserialize)]
struct GcalExtendedPropsIn {
    #[serde(default)]
    private: Option<GcalPrivatePropsIn>,
}

#[derive(Deserialize)]
struct GcalPrivatePropsIn {
    #[serde(rename = "bookingId", default)]
    booking_id: Option<String>,
}

impl GcalEventItem {
    fn event_time(&self) -> Option<EventTime> {
        let start = self.start.as_ref()?;
        let end = self.end.as_ref()?;
        if let (Some(start_date), Some(end_date)) = (start.date, end.date) {
            return Some(EventTime::AllDay { start_date, end_date });
        }
        if let (Some(start), Some(end)) = (start.date_time, end.date_time) {
            return Some(EventTime::Timed { start, end });
        }
        None
    }
}
