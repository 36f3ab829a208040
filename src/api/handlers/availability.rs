use axum::{extract::{Query, State}, response::IntoResponse, Json};
use chrono::NaiveDate;
use std::sync::Arc;

use crate::api::dtos::requests::AvailabilityQuery;
use crate::api::dtos::responses::{AvailableDatesResponse, AvailableSlotsResponse};
use crate::error::AppError;
use crate::state::AppState;

/// Booking-page month views never need more than this.
const MAX_RANGE_DAYS: i64 = 92;

fn parse_range(params: &AvailabilityQuery) -> Result<(NaiveDate, NaiveDate), AppError> {
    let start = NaiveDate::parse_from_str(&params.start_date, "%Y-%m-%d")
        .map_err(|_| AppError::Validation("Invalid startDate format".into()))?;
    let end = NaiveDate::parse_from_str(&params.end_date, "%Y-%m-%d")
        .map_err(|_| AppError::Validation("Invalid endDate format".into()))?;
    if end < start {
        return Err(AppError::Validation("endDate must not be before startDate".into()));
    }
    if (end - start).num_days() > MAX_RANGE_DAYS {
        return Err(AppError::Validation("Date range too large".into()));
    }
    if params.service_duration <= 0 {
        return Err(AppError::Validation("serviceDuration must be positive".into()));
    }
    Ok((start, end))
}

pub async fn get_availability(
    State(state): State<Arc<AppState>>,
    Query(params): Query<AvailabilityQuery>,
) -> Result<impl IntoResponse, AppError> {
    let (start, end) = parse_range(&params)?;

    let available_slots = if start == end {
        state.availability.available_slots(start, params.service_duration).await?
    } else {
        state.availability.available_slots_range(start, end, params.service_duration).await?
    };

    Ok(Json(AvailableSlotsResponse { available_slots }))
}

pub async fn get_available_dates(
    State(state): State<Arc<AppState>>,
    Query(params): Query<AvailabilityQuery>,
) -> Result<impl IntoResponse, AppError> {
    let (start, end) = parse_range(&params)?;

    let dates = state.availability.available_dates(start, end, params.service_duration).await?;
    let available_dates = dates.iter().map(|d| d.format("%Y-%m-%d").to_string()).collect();

    Ok(Json(AvailableDatesResponse { available_dates }))
}
