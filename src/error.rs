use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("Resource not found: {0}")]
    NotFound(String),
    #[error("Forbidden: {0}")]
    Forbidden(String),
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("Invalid input: {0}")]
    Validation(String),
    /// Google Calendar or the mail relay misbehaved. Callers that can
    /// degrade (availability, booking sync) catch this before it reaches
    /// the response layer.
    #[error("Upstream service failure: {0}")]
    Upstream(String),
    #[error("Internal invariant violated: {0}")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::Database(e) => {
                if let Some(db_err) = e.as_database_error() {
                    let code = db_err.code().unwrap_or_default();

                    // 2067 = SQLite unique violation, 23505 = Postgres.
                    // Hit when two writers race on the same manage token
                    // or weekday row.
                    if code == "2067" || code == "23505" {
                        return (
                            StatusCode::CONFLICT,
                            Json(json!({ "error": "Duplicate entry" })),
                        )
                            .into_response();
                    }

                    // 787 = SQLite foreign key violation, 23503 = Postgres.
                    // A booking or waitlist row pointing at a service that
                    // was deleted mid-request.
                    if code == "787" || code == "23503" {
                        return (
                            StatusCode::BAD_REQUEST,
                            Json(json!({ "error": "Referenced resource no longer exists" })),
                        )
                            .into_response();
                    }
                }

                error!("Database error: {:?}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
            }
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            AppError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg.clone()),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::Upstream(msg) => {
                error!("Upstream failure: {}", msg);
                (StatusCode::BAD_GATEWAY, "Upstream service unavailable".to_string())
            }
            AppError::Internal(msg) => {
                error!("Internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
            }
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}
