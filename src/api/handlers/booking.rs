use axum::{extract::State, response::IntoResponse, Json};
use crate::api::dtos::requests::CreateBookingRequest;
use crate::domain::models::booking::{Booking, NewBookingParams};
use crate::domain::services::business_calendar::BusinessCalendar;
use crate::error::AppError;
use crate::state::AppState;
use std::sync::Arc;
use chrono::{NaiveDate, NaiveTime};
use tracing::{info, warn};

pub async fn create_booking(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CreateBookingRequest>,
) -> Result<impl IntoResponse, AppError> {
    let service = state.service_repo.find_by_id(&payload.service_id).await?
        .ok_or(AppError::NotFound("Service not found".into()))?;
    if !service.active {
        return Err(AppError::Conflict("Service is no longer offered".into()));
    }

    let date = NaiveDate::parse_from_str(&payload.date, "%Y-%m-%d")
        .map_err(|_| AppError::Validation("Invalid date format".into()))?;
    let time = NaiveTime::parse_from_str(&payload.time, "%H:%M")
        .map_err(|_| AppError::Validation("Invalid time format (HH:MM)".into()))?;

    // The resolver owns every booking rule: past dates, the floor date,
    // closed days, buffers, and collisions all fall out of this one check.
    let valid_slots = state.availability.available_slots(date, service.duration_min).await?;
    let requested = time.format("%H:%M").to_string();
    if !valid_slots.contains(&requested) {
        warn!("Booking rejected: slot {} {} not available. Valid: {:?}", date, requested, valid_slots);
        return Err(AppError::Conflict("Selected time slot is not available".into()));
    }

    let booking = Booking::new(NewBookingParams {
        service_id: service.id.clone(),
        date,
        start_time: time,
        duration_min: service.duration_min,
        name: payload.name,
        email: payload.email,
        note: payload.notes,
        waitlist_request_id: payload.waitlist_request_id,
    });

    let created = state.booking_repo.create(&booking).await?;
    state.availability.invalidate(date);

    let settings = state.settings_repo.load().await?;
    let tz = BusinessCalendar::new(&settings).tz();
    match state.calendar.create_event(&created, &service.name, tz).await {
        Ok(Some(event_id)) => {
            if let Err(e) = state.booking_repo.set_calendar_event_id(&created.id, &event_id).await {
                warn!("Could not store calendar event id for booking {}: {}", created.id, e);
            }
        }
        Ok(None) => {}
        Err(e) => warn!("Calendar sync failed for booking {}: {}", created.id, e),
    }

    if let Some(waitlist_id) = &created.waitlist_request_id {
        match state.waitlist_repo.mark_converted(waitlist_id).await {
            Ok(true) => info!("Waitlist request {} converted by booking {}", waitlist_id, created.id),
            Ok(false) => warn!("Waitlist request {} was not awaiting conversion", waitlist_id),
            Err(e) => warn!("Waitlist conversion failed for {}: {}", waitlist_id, e),
        }
    }

    let notifier = state.notifier.clone();
    let service_name = service.name.clone();
    let manage_link = format!("{}/manage/{}", state.config.frontend_url, created.manage_token);
    let for_mail = created.clone();
    tokio::spawn(async move {
        if let Err(e) = notifier.booking_confirmed(&for_mail, &service_name, &manage_link).await {
            warn!("Confirmation email failed for booking {}: {}", for_mail.id, e);
        }
    });

    info!("Booking confirmed: {} for service {}", created.id, service.id);
    Ok(Json(created))
}

pub async fn list_bookings(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, AppError> {
    let bookings = state.booking_repo.list().await?;
    Ok(Json(bookings))
}
