pub mod availability;
pub mod booking;
pub mod booking_management;
pub mod health;
pub mod service;
pub mod settings;
pub mod waitlist;
