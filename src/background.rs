use std::sync::Arc;
use std::time::Duration;
use chrono::{NaiveDate, Utc};
use tokio::time::sleep;
use tracing::{error, info, info_span, Instrument};
use crate::domain::services::business_calendar::BusinessCalendar;
use crate::state::AppState;

const TICK_SECS: u64 = 60;

/// Expires overdue notifications every tick and runs the matching scan once
/// per business-calendar day. The first tick after startup scans right away;
/// a failed scan is retried on the next tick.
pub async fn start_background_worker(state: Arc<AppState>) {
    info!("Starting waitlist background worker...");

    let mut last_scan_date: Option<NaiveDate> = None;

    loop {
        run_tick(&state, &mut last_scan_date)
            .instrument(info_span!("waitlist_maintenance"))
            .await;
        sleep(Duration::from_secs(TICK_SECS)).await;
    }
}

async fn run_tick(state: &Arc<AppState>, last_scan_date: &mut Option<NaiveDate>) {
    if let Err(e) = state.matcher.expire_overdue().await {
        error!("Expiry sweep failed: {:?}", e);
    }

    let today = match state.settings_repo.load().await {
        Ok(settings) => BusinessCalendar::new(&settings).today_at(Utc::now()),
        Err(e) => {
            error!("Could not load settings for scan scheduling: {:?}", e);
            return;
        }
    };

    if *last_scan_date == Some(today) {
        return;
    }

    info!("Running daily waitlist scan for {}", today);
    match state.matcher.run_scan().await {
        Ok(outcome) => {
            info!(
                processed = outcome.processed,
                notified = outcome.notified,
                "Daily scan finished"
            );
            *last_scan_date = Some(today);
        }
        Err(e) => error!("Daily scan failed: {:?}", e),
    }
}
