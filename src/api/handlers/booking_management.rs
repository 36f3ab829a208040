use axum::{extract::{Path, State}, response::IntoResponse, Json};
use crate::api::dtos::requests::RescheduleBookingRequest;
use crate::domain::models::booking::Booking;
use crate::domain::services::business_calendar::BusinessCalendar;
use crate::error::AppError;
use crate::state::AppState;
use std::sync::Arc;
use chrono::{NaiveDate, NaiveTime, Utc};
use tracing::{info, warn};

async fn find_booking(state: &AppState, token: &str) -> Result<Booking, AppError> {
    state.booking_repo.find_by_manage_token(token).await?
        .ok_or(AppError::NotFound("Booking not found".into()))
}

pub async fn get_booking_by_token(
    State(state): State<Arc<AppState>>,
    Path(token): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let booking = find_booking(&state, &token).await?;

    let service = state.service_repo.find_by_id(&booking.service_id).await?
        .ok_or_else(|| AppError::Internal(format!("Booking {} references missing service", booking.id)))?;

    let response = serde_json::json!({
        "booking": booking,
        "service": service
    });

    Ok(Json(response))
}

pub async fn cancel_booking(
    State(state): State<Arc<AppState>>,
    Path(token): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let booking = find_booking(&state, &token).await?;

    let settings = state.settings_repo.load().await?;
    let today = BusinessCalendar::new(&settings).today_at(Utc::now());
    if booking.date < today {
        return Err(AppError::Forbidden("Past bookings cannot be changed".into()));
    }

    let cancelled = state.booking_repo.cancel(&booking.id).await?;
    if !cancelled {
        return Err(AppError::Conflict("Booking is already cancelled".into()));
    }
    state.availability.invalidate(booking.date);
    info!("Booking cancelled via management token: {}", booking.id);

    if let Some(event_id) = &booking.calendar_event_id {
        if let Err(e) = state.calendar.delete_event(event_id).await {
            warn!("Calendar event {} not removed for booking {}: {}", event_id, booking.id, e);
        }
    }

    if let Ok(Some(service)) = state.service_repo.find_by_id(&booking.service_id).await {
        let notifier = state.notifier.clone();
        let for_mail = booking.clone();
        tokio::spawn(async move {
            if let Err(e) = notifier.booking_cancelled(&for_mail, &service.name).await {
                warn!("Cancellation email failed for booking {}: {}", for_mail.id, e);
            }
        });
    }

    Ok(Json(serde_json::json!({ "status": "cancelled" })))
}

pub async fn reschedule_booking(
    State(state): State<Arc<AppState>>,
    Path(token): Path<String>,
    Json(payload): Json<RescheduleBookingRequest>,
) -> Result<impl IntoResponse, AppError> {
    let booking = find_booking(&state, &token).await?;

    if booking.status == "CANCELLED" {
        return Err(AppError::Conflict("Cannot reschedule a cancelled booking".into()));
    }

    let settings = state.settings_repo.load().await?;
    let today = BusinessCalendar::new(&settings).today_at(Utc::now());
    if booking.date < today {
        return Err(AppError::Forbidden("Past bookings cannot be changed".into()));
    }

    let date = NaiveDate::parse_from_str(&payload.date, "%Y-%m-%d")
        .map_err(|_| AppError::Validation("Invalid date format".into()))?;
    let time = NaiveTime::parse_from_str(&payload.time, "%H:%M")
        .map_err(|_| AppError::Validation("Invalid time format (HH:MM)".into()))?;

    // Same resolver as creation, minus the booking's own interval so it can
    // move to an adjacent or overlapping time.
    let valid_slots = state.availability
        .available_slots_excluding(date, booking.duration_min, &booking.id)
        .await?;
    let requested = time.format("%H:%M").to_string();
    if !valid_slots.contains(&requested) {
        return Err(AppError::Conflict("Target slot is not available".into()));
    }

    let old_date = booking.date;
    let updated = state.booking_repo.reschedule(&booking.id, date, time).await?;
    state.availability.invalidate(old_date);
    state.availability.invalidate(date);

    if let Some(event_id) = &updated.calendar_event_id {
        let service_name = state.service_repo.find_by_id(&updated.service_id).await?
            .map(|s| s.name)
            .unwrap_or_else(|| "Appointment".to_string());
        let tz = BusinessCalendar::new(&settings).tz();
        if let Err(e) = state.calendar.update_event(event_id, &updated, &service_name, tz).await {
            warn!("Calendar event {} not moved for booking {}: {}", event_id, updated.id, e);
        }
    }

    info!("Booking rescheduled: {} to {} {}", updated.id, date, requested);
    Ok(Json(updated))
}
