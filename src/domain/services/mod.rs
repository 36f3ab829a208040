pub mod availability;
pub mod business_calendar;
pub mod intervals;
pub mod slot_cache;
pub mod waitlist_matcher;
