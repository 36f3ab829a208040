pub mod booking;
pub mod calendar;
pub mod interval;
pub mod service;
pub mod settings;
pub mod waitlist;
