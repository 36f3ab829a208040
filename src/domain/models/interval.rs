use chrono::{NaiveDate, NaiveTime, Timelike};

/// Minutes in a full-day block (00:00 through 23:59).
pub const FULL_DAY_MINUTES: i32 = 1439;

#[derive(Debug, Clone, PartialEq)]
pub enum IntervalSource {
    Booking { booking_id: String },
    ExternalBlock,
}

/// A stretch of busy time on one calendar date, in business wall-clock time.
/// Never crosses midnight; multi-day sources are split before this exists.
#[derive(Debug, Clone, PartialEq)]
pub struct OccupiedInterval {
    pub date: NaiveDate,
    pub start: NaiveTime,
    pub duration_min: i32,
    pub source: IntervalSource,
}

impl OccupiedInterval {
    pub fn full_day(date: NaiveDate, source: IntervalSource) -> Self {
        Self {
            date,
            start: NaiveTime::MIN,
            duration_min: FULL_DAY_MINUTES,
            source,
        }
    }

    pub fn start_min(&self) -> i32 {
        self.start.hour() as i32 * 60 + self.start.minute() as i32
    }

    pub fn end_min(&self) -> i32 {
        self.start_min() + self.duration_min
    }
}
