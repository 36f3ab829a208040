use axum::{
    body::Body,
    extract::Request,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use crate::state::AppState;
use crate::api::handlers::{availability, booking, booking_management, health, service, settings, waitlist};
use tower_http::{
    trace::TraceLayer,
    classify::ServerErrorsFailureClass,
};
use tracing::{info_span, Span, error, info};
use uuid::Uuid;

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health::health))

        // Services
        .route("/api/v1/services", get(service::list_services).post(service::create_service))
        .route("/api/v1/services/{id}", get(service::get_service).put(service::update_service).delete(service::delete_service))

        // Business configuration
        .route("/api/v1/settings", get(settings::get_settings).put(settings::update_settings))
        .route("/api/v1/settings/hours", get(settings::get_hours).put(settings::update_hours))

        // Public booking flow
        .route("/api/v1/availability", get(availability::get_availability))
        .route("/api/v1/availability/dates", get(availability::get_available_dates))
        .route("/api/v1/bookings", post(booking::create_booking).get(booking::list_bookings))

        // Customer booking management
        .route("/api/v1/bookings/manage/{token}", get(booking_management::get_booking_by_token))
        .route("/api/v1/bookings/manage/{token}/cancel", post(booking_management::cancel_booking))
        .route("/api/v1/bookings/manage/{token}/reschedule", post(booking_management::reschedule_booking))

        // Waitlist
        .route("/api/v1/waitlist", post(waitlist::join_waitlist).get(waitlist::list_waitlist))
        .route("/api/v1/waitlist/{id}/cancel", post(waitlist::cancel_waitlist))

        // External scheduler hook
        .route("/api/v1/cron/waitlist-scan", post(waitlist::run_scan))

        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &Request<Body>| {
                    let request_id = Uuid::new_v4().to_string();
                    info_span!(
                        "http_request",
                        request_id = %request_id,
                        method = ?request.method(),
                        uri = ?request.uri(),
                        version = ?request.version(),
                    )
                })
                .on_request(|request: &Request<Body>, _span: &Span| {
                    info!("started processing request: {} {}", request.method(), request.uri().path());
                })
                .on_response(|response: &axum::http::Response<Body>, latency: Duration, _span: &Span| {
                    info!(
                        status = response.status().as_u16(),
                        latency_ms = latency.as_millis(),
                        "finished processing request"
                    );
                })
                .on_failure(|error: ServerErrorsFailureClass, _latency: Duration, _span: &Span| {
                    error!("request failed: {:?}", error);
                })
        )
        .with_state(state)
}
