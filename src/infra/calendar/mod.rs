pub mod google_calendar;
pub mod null_calendar;
