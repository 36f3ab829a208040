use axum::{extract::State, response::IntoResponse, Json};
use crate::api::dtos::requests::{HourRuleRequest, UpdateSettingsRequest};
use crate::domain::models::settings::BusinessHourRule;
use crate::error::AppError;
use crate::state::AppState;
use std::sync::Arc;
use chrono::{NaiveDate, NaiveTime};
use chrono_tz::Tz;
use tracing::info;

pub async fn get_settings(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, AppError> {
    let settings = state.settings_repo.load().await?;
    Ok(Json(serde_json::json!({
        "settings": settings,
        "calendar_connected": state.calendar.is_connected()
    })))
}

pub async fn update_settings(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<UpdateSettingsRequest>,
) -> Result<impl IntoResponse, AppError> {
    if payload.timezone.parse::<Tz>().is_err() {
        return Err(AppError::Validation("Unknown timezone".into()));
    }
    if payload.buffer_min < 0 {
        return Err(AppError::Validation("Buffer must not be negative".into()));
    }

    let floor = match &payload.booking_floor_date {
        Some(raw) => Some(
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .map_err(|_| AppError::Validation("Invalid booking floor date".into()))?,
        ),
        None => None,
    };

    state.settings_repo
        .update_settings(&payload.timezone, payload.buffer_min, floor, payload.waitlist_enabled)
        .await?;
    state.availability.clear_cache();

    info!("Business settings updated");
    Ok(Json(serde_json::json!({ "status": "updated" })))
}

pub async fn get_hours(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, AppError> {
    let settings = state.settings_repo.load().await?;
    Ok(Json(settings.hours))
}

pub async fn update_hours(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<Vec<HourRuleRequest>>,
) -> Result<impl IntoResponse, AppError> {
    let mut rules = Vec::with_capacity(payload.len());
    for rule in &payload {
        if !(0..=6).contains(&rule.weekday) {
            return Err(AppError::Validation("Weekday must be 0 (Sunday) through 6".into()));
        }
        if rules.iter().any(|r: &BusinessHourRule| r.weekday == rule.weekday) {
            return Err(AppError::Validation("Duplicate weekday rule".into()));
        }
        let open_time = NaiveTime::parse_from_str(&rule.open_time, "%H:%M")
            .map_err(|_| AppError::Validation("Invalid open time (HH:MM)".into()))?;
        let close_time = NaiveTime::parse_from_str(&rule.close_time, "%H:%M")
            .map_err(|_| AppError::Validation("Invalid close time (HH:MM)".into()))?;
        if rule.is_open && close_time <= open_time {
            return Err(AppError::Validation("Close time must be after open time".into()));
        }
        rules.push(BusinessHourRule {
            weekday: rule.weekday,
            is_open: rule.is_open,
            open_time,
            close_time,
        });
    }

    state.settings_repo.update_hours(&rules).await?;
    state.availability.clear_cache();

    info!("Business hours updated ({} rules)", rules.len());
    Ok(Json(serde_json::json!({ "status": "updated" })))
}
