use std::sync::Arc;
use crate::domain::ports::{
    BookingRepository, CalendarService, Notifier, ServiceRepository,
    SettingsRepository, WaitlistRepository,
};
use crate::domain::services::availability::AvailabilityService;
use crate::domain::services::waitlist_matcher::WaitlistMatcher;
use crate::config::Config;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub service_repo: Arc<dyn ServiceRepository>,
    pub booking_repo: Arc<dyn BookingRepository>,
    pub waitlist_repo: Arc<dyn WaitlistRepository>,
    pub settings_repo: Arc<dyn SettingsRepository>,
    pub calendar: Arc<dyn CalendarService>,
    pub notifier: Arc<dyn Notifier>,
    pub availability: Arc<AvailabilityService>,
    pub matcher: Arc<WaitlistMatcher>,
}
