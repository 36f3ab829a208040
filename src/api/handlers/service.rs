use axum::{extract::{Path, Query, State}, response::IntoResponse, Json};
use crate::api::dtos::requests::{CreateServiceRequest, ListServicesQuery, UpdateServiceRequest};
use crate::domain::models::service::Service;
use crate::error::AppError;
use crate::state::AppState;
use std::sync::Arc;
use tracing::info;

pub async fn create_service(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CreateServiceRequest>,
) -> Result<impl IntoResponse, AppError> {
    if payload.name.trim().is_empty() {
        return Err(AppError::Validation("Service name is required".into()));
    }
    if payload.duration_min <= 0 {
        return Err(AppError::Validation("Duration must be positive".into()));
    }
    if payload.price_cents < 0 {
        return Err(AppError::Validation("Price must not be negative".into()));
    }

    let service = Service::new(payload.name, payload.description, payload.duration_min, payload.price_cents);
    let created = state.service_repo.create(&service).await?;
    info!("Service created: {} ({})", created.name, created.id);
    Ok(Json(created))
}

pub async fn list_services(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListServicesQuery>,
) -> Result<impl IntoResponse, AppError> {
    let services = if params.all.unwrap_or(false) {
        state.service_repo.list().await?
    } else {
        state.service_repo.list_active().await?
    };
    Ok(Json(services))
}

pub async fn get_service(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let service = state.service_repo.find_by_id(&id).await?
        .ok_or(AppError::NotFound("Service not found".into()))?;
    Ok(Json(service))
}

pub async fn update_service(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateServiceRequest>,
) -> Result<impl IntoResponse, AppError> {
    let mut service = state.service_repo.find_by_id(&id).await?
        .ok_or(AppError::NotFound("Service not found".into()))?;

    if let Some(name) = payload.name { service.name = name; }
    if let Some(description) = payload.description { service.description = Some(description); }
    if let Some(duration_min) = payload.duration_min {
        if duration_min <= 0 {
            return Err(AppError::Validation("Duration must be positive".into()));
        }
        service.duration_min = duration_min;
    }
    if let Some(price_cents) = payload.price_cents {
        if price_cents < 0 {
            return Err(AppError::Validation("Price must not be negative".into()));
        }
        service.price_cents = price_cents;
    }
    if let Some(active) = payload.active { service.active = active; }

    let updated = state.service_repo.update(&service).await?;
    info!("Service updated: {}", updated.id);
    Ok(Json(updated))
}

pub async fn delete_service(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    state.service_repo.delete(&id).await?;
    info!("Service deleted: {}", id);
    Ok(Json(serde_json::json!({ "status": "deleted" })))
}
