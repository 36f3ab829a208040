use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use sqlx::{postgres::{PgPoolOptions, PgConnectOptions}, sqlite::{SqlitePoolOptions, SqliteJournalMode, SqliteConnectOptions}};
use sqlx::{PgPool, SqlitePool, ConnectOptions};
use tracing::info;
use tracing::log::LevelFilter;

use crate::config::Config;
use crate::domain::ports::{
    BookingRepository, CalendarService, Notifier, ServiceRepository,
    SettingsRepository, WaitlistRepository,
};
use crate::domain::services::availability::AvailabilityService;
use crate::domain::services::slot_cache::SlotCache;
use crate::domain::services::waitlist_matcher::WaitlistMatcher;
use crate::infra::calendar::{google_calendar::GoogleCalendarClient, null_calendar::NullCalendarService};
use crate::infra::email::http_email_service::HttpEmailService;
use crate::infra::repositories::{
    postgres_booking_repo::PostgresBookingRepo, postgres_service_repo::PostgresServiceRepo,
    postgres_settings_repo::PostgresSettingsRepo, postgres_waitlist_repo::PostgresWaitlistRepo,
    sqlite_booking_repo::SqliteBookingRepo, sqlite_service_repo::SqliteServiceRepo,
    sqlite_settings_repo::SqliteSettingsRepo, sqlite_waitlist_repo::SqliteWaitlistRepo,
};
use crate::state::AppState;

pub async fn bootstrap_state(config: &Config) -> AppState {
    let database_url = &config.database_url;

    let notifier: Arc<dyn Notifier> = Arc::new(HttpEmailService::new(
        config.mail_service_url.clone(),
        config.mail_service_token.clone(),
    ));

    let calendar: Arc<dyn CalendarService> = match (&config.google_calendar_id, &config.google_api_token) {
        (Some(calendar_id), Some(token)) => {
            info!("Google Calendar connected: {}", calendar_id);
            Arc::new(GoogleCalendarClient::new(
                config.google_api_base.clone(),
                calendar_id.clone(),
                token.clone(),
            ))
        }
        _ => {
            info!("No calendar configured, external blocks disabled");
            Arc::new(NullCalendarService)
        }
    };

    let (service_repo, booking_repo, waitlist_repo, settings_repo): (
        Arc<dyn ServiceRepository>,
        Arc<dyn BookingRepository>,
        Arc<dyn WaitlistRepository>,
        Arc<dyn SettingsRepository>,
    ) = if database_url.starts_with("postgres://") || database_url.starts_with("postgresql://") {
        info!("Initializing PostgreSQL connection...");

        let mut opts: PgConnectOptions = database_url.parse().expect("Invalid Postgres URL");
        opts = opts.log_statements(LevelFilter::Debug)
            .log_slow_statements(LevelFilter::Warn, Duration::from_millis(500));

        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect_with(opts)
            .await
            .expect("Failed to connect to Postgres");

        run_postgres_migrations(&pool).await;

        (
            Arc::new(PostgresServiceRepo::new(pool.clone())),
            Arc::new(PostgresBookingRepo::new(pool.clone())),
            Arc::new(PostgresWaitlistRepo::new(pool.clone())),
            Arc::new(PostgresSettingsRepo::new(pool)),
        )
    } else {
        info!("Initializing SQLite connection with WAL Mode...");

        let opts = SqliteConnectOptions::from_str(database_url)
            .expect("Invalid SQLite connection string")
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(Duration::from_secs(5))
            .log_statements(LevelFilter::Debug)
            .log_slow_statements(LevelFilter::Warn, Duration::from_millis(500));

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(opts)
            .await
            .expect("Failed to connect to SQLite");

        run_sqlite_migrations(&pool).await;

        (
            Arc::new(SqliteServiceRepo::new(pool.clone())),
            Arc::new(SqliteBookingRepo::new(pool.clone())),
            Arc::new(SqliteWaitlistRepo::new(pool.clone())),
            Arc::new(SqliteSettingsRepo::new(pool)),
        )
    };

    let availability = Arc::new(AvailabilityService::new(
        settings_repo.clone(),
        booking_repo.clone(),
        calendar.clone(),
        Arc::new(SlotCache::new()),
    ));

    let matcher = Arc::new(WaitlistMatcher::new(
        waitlist_repo.clone(),
        service_repo.clone(),
        settings_repo.clone(),
        availability.clone(),
        notifier.clone(),
        config.frontend_url.clone(),
    ));

    AppState {
        config: config.clone(),
        service_repo,
        booking_repo,
        waitlist_repo,
        settings_repo,
        calendar,
        notifier,
        availability,
        matcher,
    }
}

async fn run_postgres_migrations(pool: &PgPool) {
    sqlx::migrate!("./migrations/postgres")
        .run(pool)
        .await
        .expect("Failed to run Postgres migrations");
}

async fn run_sqlite_migrations(pool: &SqlitePool) {
    sqlx::migrate!("./migrations/sqlite")
        .run(pool)
        .await
        .expect("Failed to run SQLite migrations");
}
