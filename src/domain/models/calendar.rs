use chrono::{DateTime, NaiveDate, Utc};

/// Description marker written into calendar events created by this system.
/// Newer events also carry the booking id as a private extended property;
/// both forms are honored on read. This is the contract with the external
/// calendar: anything else on the calendar counts as a block.
pub const BOOKING_MARKER: &str = "Booking ID:";

#[derive(Debug, Clone, PartialEq)]
pub enum EventTime {
    /// All-day event; `end_date` is exclusive, per the calendar API.
    AllDay {
        start_date: NaiveDate,
        end_date: NaiveDate,
    },
    Timed {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },
}

/// A raw event from the external calendar, before interval expansion.
#[derive(Debug, Clone)]
pub struct ExternalEvent {
    pub id: String,
    pub description: Option<String>,
    pub booking_id: Option<String>,
    pub time: EventTime,
}

impl ExternalEvent {
    /// Events this system created mirror a booking row; counting them again
    /// would double-block the slot.
    pub fn is_salon_booking(&self) -> bool {
        self.booking_id.is_some()
            || self
                .description
                .as_deref()
                .is_some_and(|d| d.contains(BOOKING_MARKER))
    }
}
