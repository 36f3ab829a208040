use std::sync::Arc;

use chrono::{Duration, NaiveDate, NaiveTime, Utc};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::domain::models::waitlist::WaitlistRequest;
use crate::domain::ports::{
    Notifier, ServiceRepository, SettingsRepository, WaitlistMatchNotice, WaitlistRepository,
};
use crate::domain::services::availability::AvailabilityService;
use crate::domain::services::business_calendar::BusinessCalendar;
use crate::error::AppError;

/// How long a notified customer holds the match before it expires.
pub const NOTIFY_EXPIRY_HOURS: i64 = 48;

#[derive(Debug, Default, Serialize)]
pub struct ScanOutcome {
    pub processed: u32,
    pub notified: u32,
}

/// Batch matcher for pending waitlist requests. One scan walks the pending
/// queue oldest first and notifies each request at most once; a failure on
/// one request never aborts the rest of the batch.
pub struct WaitlistMatcher {
    waitlist_repo: Arc<dyn WaitlistRepository>,
    service_repo: Arc<dyn ServiceRepository>,
    settings_repo: Arc<dyn SettingsRepository>,
    availability: Arc<AvailabilityService>,
    notifier: Arc<dyn Notifier>,
    frontend_url: String,
}

impl WaitlistMatcher {
    pub fn new(
        waitlist_repo: Arc<dyn WaitlistRepository>,
        service_repo: Arc<dyn ServiceRepository>,
        settings_repo: Arc<dyn SettingsRepository>,
        availability: Arc<AvailabilityService>,
        notifier: Arc<dyn Notifier>,
        frontend_url: String,
    ) -> Self {
        Self {
            waitlist_repo,
            service_repo,
            settings_repo,
            availability,
            notifier,
            frontend_url,
        }
    }

    /// NOTIFIED rows whose 48h window ran out become EXPIRED.
    pub async fn expire_overdue(&self) -> Result<u64, AppError> {
        let expired = self.waitlist_repo.expire_overdue(Utc::now()).await?;
        if expired > 0 {
            info!("Expired {} overdue waitlist notifications", expired);
        }
        Ok(expired)
    }

    pub async fn run_scan(&self) -> Result<ScanOutcome, AppError> {
        let settings = self.settings_repo.load().await?;
        if !settings.waitlist_enabled {
            info!("Waitlist disabled, skipping scan");
            return Ok(ScanOutcome::default());
        }

        let today = BusinessCalendar::new(&settings).today_at(Utc::now());
        let pending = self.waitlist_repo.list_pending().await?;

        let mut outcome = ScanOutcome::default();
        for request in pending {
            outcome.processed += 1;
            match self.match_request(&request, today).await {
                Ok(true) => outcome.notified += 1,
                Ok(false) => {}
                Err(e) => {
                    warn!("Waitlist scan failed for request {}: {}", request.id, e);
                }
            }
        }

        info!(
            processed = outcome.processed,
            notified = outcome.notified,
            "Waitlist scan complete"
        );
        Ok(outcome)
    }

    /// Walks the request's date window from today forward; the first date
    /// with an opening wins and the earliest slot on it is offered. The
    /// notification goes out before the status flips, so a failed send
    /// leaves the request PENDING for the next scan instead of burning the
    /// match.
    async fn match_request(&self, request: &WaitlistRequest, today: NaiveDate) -> Result<bool, AppError> {
        let Some(service) = self.service_repo.find_by_id(&request.service_id).await? else {
            debug!("Waitlist request {} references a removed service, skipping", request.id);
            return Ok(false);
        };
        if !service.active {
            debug!("Waitlist request {} references inactive service {}, skipping", request.id, service.id);
            return Ok(false);
        }

        let mut date = request.start_date.max(today);
        while date <= request.end_date {
            let slots = self.availability.available_slots(date, service.duration_min).await?;
            if let Some(first) = slots.first() {
                let time = NaiveTime::parse_from_str(first, "%H:%M")
                    .map_err(|e| AppError::Internal(format!("Bad slot format '{}': {}", first, e)))?;

                let notice = WaitlistMatchNotice {
                    customer_name: request.customer_name.clone(),
                    customer_email: request.customer_email.clone(),
                    service_name: service.name.clone(),
                    matched_date: date,
                    matched_time: time,
                    booking_link: format!(
                        "{}/book?serviceId={}&date={}&time={}&waitlistRequestId={}",
                        self.frontend_url, service.id, date, first, request.id
                    ),
                };
                self.notifier.waitlist_match(&notice).await?;

                let now = Utc::now();
                let updated = self
                    .waitlist_repo
                    .mark_notified(&request.id, now, now + Duration::hours(NOTIFY_EXPIRY_HOURS))
                    .await?;
                if !updated {
                    warn!("Waitlist request {} changed status during scan", request.id);
                }
                return Ok(true);
            }
            date += Duration::days(1);
        }

        Ok(false)
    }
}
