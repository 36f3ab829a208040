use std::sync::Arc;

use chrono::{Duration, NaiveDate, Timelike};
use tracing::warn;

use crate::domain::models::calendar::{EventTime, ExternalEvent};
use crate::domain::models::interval::{IntervalSource, OccupiedInterval};
use crate::domain::ports::{BookingRepository, CalendarService};
use crate::domain::services::business_calendar::BusinessCalendar;
use crate::error::AppError;

/// Assembles the occupied intervals for a date from the booking store and
/// the external calendar. Booking-store failures are fatal for the query;
/// calendar failures degrade to zero blocks (open on error).
pub struct IntervalStore {
    booking_repo: Arc<dyn BookingRepository>,
    calendar: Arc<dyn CalendarService>,
}

impl IntervalStore {
    pub fn new(booking_repo: Arc<dyn BookingRepository>, calendar: Arc<dyn CalendarService>) -> Self {
        Self { booking_repo, calendar }
    }

    pub async fn occupied_on(
        &self,
        cal: &BusinessCalendar<'_>,
        date: NaiveDate,
        exclude_booking: Option<&str>,
    ) -> Result<Vec<OccupiedInterval>, AppError> {
        let mut intervals = Vec::new();

        let bookings = self.booking_repo.list_active_on(date).await?;
        for booking in bookings {
            if exclude_booking.is_some_and(|id| id == booking.id) {
                continue;
            }
            intervals.push(OccupiedInterval {
                date,
                start: booking.start_time,
                duration_min: booking.duration_min,
                source: IntervalSource::Booking { booking_id: booking.id },
            });
        }

        let (window_start, window_end) = cal.day_window_utc(date);
        match self.calendar.events_between(window_start, window_end).await {
            Ok(events) => {
                for event in events {
                    if event.is_salon_booking() {
                        // Mirrored by a booking row; counting it again would
                        // double-block the slot.
                        continue;
                    }
                    for interval in expand_external_event(&event, cal) {
                        if interval.date == date {
                            intervals.push(interval);
                        }
                    }
                }
            }
            Err(e) => {
                warn!("Calendar fetch failed for {}, treating day as unblocked: {}", date, e);
            }
        }

        Ok(intervals)
    }
}

/// Splits a calendar event into per-date intervals in business wall-clock
/// time. All-day events block whole days; timed events crossing midnight are
/// split at date boundaries, with fully covered middle days blocked whole.
pub fn expand_external_event(event: &ExternalEvent, cal: &BusinessCalendar<'_>) -> Vec<OccupiedInterval> {
    let mut out = Vec::new();

    match &event.time {
        EventTime::AllDay { start_date, end_date } => {
            if *end_date <= *start_date {
                // Degenerate range, still a real event. Block the start date.
                out.push(OccupiedInterval::full_day(*start_date, IntervalSource::ExternalBlock));
                return out;
            }
            let mut date = *start_date;
            while date < *end_date {
                out.push(OccupiedInterval::full_day(date, IntervalSource::ExternalBlock));
                date += Duration::days(1);
            }
        }
        EventTime::Timed { start, end } => {
            if *end <= *start {
                return out;
            }
            let (start_date, start_time) = cal.utc_to_wall(*start);
            let (end_date, end_time) = cal.utc_to_wall(*end);

            let first_start_min = start_time.hour() as i32 * 60 + start_time.minute() as i32;

            if start_date == end_date {
                // Wall-minute span, not UTC span: across a DST transition the
                // two differ, and slots live in wall-clock time.
                let end_min = end_time.hour() as i32 * 60 + end_time.minute() as i32;
                let duration = end_min - first_start_min;
                if duration > 0 {
                    out.push(OccupiedInterval {
                        date: start_date,
                        start: start_time,
                        duration_min: duration,
                        source: IntervalSource::ExternalBlock,
                    });
                }
                return out;
            }

            let first_len = crate::domain::models::interval::FULL_DAY_MINUTES - first_start_min;
            if first_len > 0 {
                out.push(OccupiedInterval {
                    date: start_date,
                    start: start_time,
                    duration_min: first_len,
                    source: IntervalSource::ExternalBlock,
                });
            }

            let mut date = start_date + Duration::days(1);
            while date < end_date {
                out.push(OccupiedInterval::full_day(date, IntervalSource::ExternalBlock));
                date += Duration::days(1);
            }

            let last_len = end_time.hour() as i32 * 60 + end_time.minute() as i32;
            if last_len > 0 {
                out.push(OccupiedInterval {
                    date: end_date,
                    start: chrono::NaiveTime::MIN,
                    duration_min: last_len,
                    source: IntervalSource::ExternalBlock,
                });
            }
        }
    }

    out
}
