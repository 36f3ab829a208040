//! Booking backend for a single-chair salon. Guests pick a service, check
//! live availability and book without an account; the confirmation mail
//! carries a manage token for reschedule and cancellation. When a week is
//! full, a waitlist takes the request and a background scan notifies the
//! customer as soon as a matching slot frees up.
//!
//! `domain` holds the scheduling rules behind repository and notifier
//! ports, `infra` the SQLite/Postgres and Google Calendar adapters, `api`
//! the axum surface and `background` the recurring waitlist maintenance.

pub mod api;
pub mod background;
pub mod config;
pub mod domain;
pub mod error;
pub mod infra;
pub mod state;

use std::sync::Arc;

use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use crate::api::router::create_router;
use crate::background::start_background_worker;
use crate::config::Config;
use crate::infra::factory::bootstrap_state;

/// File logs keep the crate at debug so a slot dispute is reconstructable
/// from production logs without a redeploy.
const FILE_LOG_DIRECTIVES: &str = "info,salon_backend=debug";

pub fn init_logging() -> WorkerGuard {
    let file_appender = tracing_appender::rolling::daily("./logs", "salon-backend.log");
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);

    let stdout_layer = tracing_subscriber::fmt::layer()
        .pretty()
        .with_target(false)
        .with_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()));

    let file_layer = tracing_subscriber::fmt::layer()
        .json()
        .with_target(true)
        .with_writer(file_writer)
        .with_filter(EnvFilter::new(FILE_LOG_DIRECTIVES));

    tracing_subscriber::registry()
        .with(stdout_layer)
        .with(file_layer)
        .init();

    info!("Logging to stdout and ./logs/ (JSON)");
    guard
}

pub async fn run() {
    let _guard = init_logging();

    let config = Config::from_env();
    let state = Arc::new(bootstrap_state(&config).await);

    if state.calendar.is_connected() {
        info!("Google Calendar sync active");
    } else {
        info!("No calendar configured, blocking on bookings only");
    }

    let worker_state = state.clone();
    tokio::spawn(async move {
        start_background_worker(worker_state).await;
    });

    let app = create_router(state);

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("Could not bind API port");

    info!("🚀 Salon backend listening on {}", addr);
    axum::serve(listener, app).await.expect("Server exited");
}
