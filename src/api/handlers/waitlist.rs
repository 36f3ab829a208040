use axum::{extract::{Path, State}, response::IntoResponse, Json};
use crate::api::dtos::requests::CreateWaitlistRequest;
use crate::domain::models::waitlist::WaitlistRequest;
use crate::domain::services::business_calendar::BusinessCalendar;
use crate::error::AppError;
use crate::state::AppState;
use std::sync::Arc;
use chrono::{NaiveDate, Utc};
use tracing::info;

pub async fn join_waitlist(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CreateWaitlistRequest>,
) -> Result<impl IntoResponse, AppError> {
    let settings = state.settings_repo.load().await?;
    if !settings.waitlist_enabled {
        return Err(AppError::Forbidden("Waitlist is disabled".into()));
    }

    let service = state.service_repo.find_by_id(&payload.service_id).await?
        .ok_or(AppError::NotFound("Service not found".into()))?;
    if !service.active {
        return Err(AppError::Conflict("Service is no longer offered".into()));
    }

    let start_date = NaiveDate::parse_from_str(&payload.start_date, "%Y-%m-%d")
        .map_err(|_| AppError::Validation("Invalid start date".into()))?;
    let end_date = NaiveDate::parse_from_str(&payload.end_date, "%Y-%m-%d")
        .map_err(|_| AppError::Validation("Invalid end date".into()))?;
    if end_date < start_date {
        return Err(AppError::Validation("End date must not be before start date".into()));
    }

    let today = BusinessCalendar::new(&settings).today_at(Utc::now());
    if end_date < today {
        return Err(AppError::Validation("Date window is entirely in the past".into()));
    }

    let request = WaitlistRequest::new(
        service.id.clone(),
        payload.name,
        payload.email,
        start_date,
        end_date,
    );
    let created = state.waitlist_repo.create(&request).await?;
    info!("Waitlist request created: {} for service {}", created.id, service.id);
    Ok(Json(created))
}

pub async fn list_waitlist(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, AppError> {
    let requests = state.waitlist_repo.list().await?;
    Ok(Json(requests))
}

pub async fn cancel_waitlist(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    state.waitlist_repo.find_by_id(&id).await?
        .ok_or(AppError::NotFound("Waitlist request not found".into()))?;

    let cancelled = state.waitlist_repo.cancel(&id).await?;
    if !cancelled {
        return Err(AppError::Conflict("Request is already resolved".into()));
    }

    info!("Waitlist request cancelled: {}", id);
    Ok(Json(serde_json::json!({ "status": "cancelled" })))
}

/// External-scheduler entry point. Sweeps expired notifications first so
/// their slots are not offered stale, then matches the pending queue.
pub async fn run_scan(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, AppError> {
    state.matcher.expire_overdue().await?;
    let outcome = state.matcher.run_scan().await?;
    Ok(Json(outcome))
}
