use serde::{Deserialize, Serialize};
use chrono::{NaiveDate, NaiveTime};
use sqlx::FromRow;

/// One row per weekday. Weekday numbering is 0 = Sunday .. 6 = Saturday,
/// matching what the booking frontend sends and stores.
#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct BusinessHourRule {
    pub weekday: i32,
    pub is_open: bool,
    pub open_time: NaiveTime,
    pub close_time: NaiveTime,
}

/// Singleton settings row plus the seven weekday rules. Loaded fresh at the
/// start of each availability resolution; never mutated mid-computation.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct BusinessSettings {
    pub timezone: String,
    pub buffer_min: i32,
    pub booking_floor_date: Option<NaiveDate>,
    pub waitlist_enabled: bool,
    pub hours: Vec<BusinessHourRule>,
}

impl BusinessSettings {
    pub fn rule_for_weekday(&self, weekday: i32) -> Option<&BusinessHourRule> {
        self.hours.iter().find(|r| r.weekday == weekday)
    }
}
