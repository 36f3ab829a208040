use std::sync::Arc;

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Timelike, Utc};

use crate::domain::ports::{BookingRepository, CalendarService, SettingsRepository};
use crate::domain::services::business_calendar::BusinessCalendar;
use crate::domain::services::intervals::IntervalStore;
use crate::domain::services::slot_cache::SlotCache;
use crate::error::AppError;

/// Candidate grid step. Fixed in production paths; exposed for tests.
pub const SLOT_STEP_MIN: i32 = 15;

fn minute_of_day(time: NaiveTime) -> i32 {
    time.hour() as i32 * 60 + time.minute() as i32
}

fn format_minute(minute: i32) -> String {
    format!("{:02}:{:02}", minute / 60, minute % 60)
}

/// Half-open interval overlap: [s1, e1) intersects [s2, e2).
pub fn overlaps(s1: i32, e1: i32, s2: i32, e2: i32) -> bool {
    s1 < e2 && s2 < e1
}

/// Every step-aligned start from `open` whose full duration fits before
/// `close`. Pure and ordered; occupancy is the resolver's job.
pub fn candidate_slots(open: NaiveTime, close: NaiveTime, duration_min: i32, step_min: i32) -> Vec<i32> {
    let mut slots = Vec::new();
    if duration_min <= 0 || step_min <= 0 {
        return slots;
    }
    let close_min = minute_of_day(close);
    let mut cursor = minute_of_day(open);
    while cursor + duration_min <= close_min {
        slots.push(cursor);
        cursor += step_min;
    }
    slots
}

/// The one resolver every caller shares: the availability API, booking
/// creation, reschedule validation, and the waitlist scan all go through
/// here, so the slot rules cannot drift apart between call sites.
pub struct AvailabilityService {
    settings_repo: Arc<dyn SettingsRepository>,
    intervals: IntervalStore,
    cache: Arc<SlotCache>,
}

impl AvailabilityService {
    pub fn new(
        settings_repo: Arc<dyn SettingsRepository>,
        booking_repo: Arc<dyn BookingRepository>,
        calendar: Arc<dyn CalendarService>,
        cache: Arc<SlotCache>,
    ) -> Self {
        Self {
            settings_repo,
            intervals: IntervalStore::new(booking_repo, calendar),
            cache,
        }
    }

    /// Free "HH:MM" starts for the date, ascending. Served from the cache
    /// when fresh.
    pub async fn available_slots(&self, date: NaiveDate, duration_min: i32) -> Result<Vec<String>, AppError> {
        if let Some(cached) = self.cache.get(date, duration_min) {
            return Ok(cached);
        }
        let slots = self.resolve(date, duration_min, None, Utc::now()).await?;
        self.cache.insert(date, duration_min, slots.clone());
        Ok(slots)
    }

    /// Reschedule validation: the booking being moved must not collide with
    /// itself, so its own interval is left out. Bypasses the cache.
    pub async fn available_slots_excluding(
        &self,
        date: NaiveDate,
        duration_min: i32,
        exclude_booking: &str,
    ) -> Result<Vec<String>, AppError> {
        self.resolve(date, duration_min, Some(exclude_booking), Utc::now()).await
    }

    /// Merged slots over an inclusive date range, de-duplicated by value for
    /// the booking page's combined view.
    pub async fn available_slots_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        duration_min: i32,
    ) -> Result<Vec<String>, AppError> {
        let mut merged = Vec::new();
        let mut date = start;
        while date <= end {
            merged.extend(self.available_slots(date, duration_min).await?);
            date += Duration::days(1);
        }
        merged.sort();
        merged.dedup();
        Ok(merged)
    }

    /// Dates in the inclusive range with at least one free slot, for the
    /// month view of the date picker.
    pub async fn available_dates(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        duration_min: i32,
    ) -> Result<Vec<NaiveDate>, AppError> {
        let mut dates = Vec::new();
        let mut date = start;
        while date <= end {
            if !self.available_slots(date, duration_min).await?.is_empty() {
                dates.push(date);
            }
            date += Duration::days(1);
        }
        Ok(dates)
    }

    pub fn invalidate(&self, date: NaiveDate) {
        self.cache.invalidate_date(date);
    }

    pub fn clear_cache(&self) {
        self.cache.clear();
    }

    /// Core resolution; `now` is passed in so tests can pin the clock.
    pub async fn resolve(
        &self,
        date: NaiveDate,
        duration_min: i32,
        exclude_booking: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<Vec<String>, AppError> {
        if duration_min <= 0 {
            return Err(AppError::Validation("Duration must be positive".to_string()));
        }

        let settings = self.settings_repo.load().await?;
        let cal = BusinessCalendar::new(&settings);

        let today = cal.today_at(now);
        if date < today || !cal.is_bookable(date) {
            return Ok(Vec::new());
        }
        let Some((open, close)) = cal.hours_for(date) else {
            return Ok(Vec::new());
        };

        let occupied = self.intervals.occupied_on(&cal, date, exclude_booking).await?;

        let buffer = settings.buffer_min.max(0);
        let effective_close = minute_of_day(close) - buffer;
        let now_min = if date == today {
            minute_of_day(cal.time_at(now))
        } else {
            -1
        };

        let mut valid_slots = Vec::new();
        for start in candidate_slots(open, close, duration_min, SLOT_STEP_MIN) {
            let end = start + duration_min;
            if end > effective_close {
                continue;
            }
            if start < now_min {
                continue;
            }
            let blocked = occupied.iter().any(|interval| {
                overlaps(start, end, interval.start_min(), interval.end_min() + buffer)
            });
            if !blocked {
                valid_slots.push(format_minute(start));
            }
        }

        Ok(valid_slots)
    }
}
