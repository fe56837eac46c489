use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use busline_core::error::CoreError;
use busline_engine::error::is_seat_ownership_violation;
use busline_engine::EngineError;
use serde_json::json;

/// Application-level error type for HTTP handlers.
///
/// Wraps [`EngineError`] and [`CoreError`] for domain errors and adds
/// HTTP-specific variants. Implements [`IntoResponse`] to produce
/// consistent JSON error responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// An error returned by an engine operation.
    #[error(transparent)]
    Engine(#[from] EngineError),

    /// A domain-level error raised at the boundary.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A database error from sqlx outside the engine (health, startup).
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A malformed request (bad header, bad path segment).
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// An internal error with a human-readable message.
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Engine(EngineError::Core(core)) | AppError::Core(core) => {
                classify_core_error(core)
            }
            AppError::Engine(EngineError::Database(err)) | AppError::Database(err) => {
                classify_sqlx_error(err)
            }
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
            AppError::InternalError(msg) => {
                tracing::error!(error = %msg, "Internal error");
                internal()
            }
        };

        let body = json!({
            "error": message,
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}

fn classify_core_error(err: &CoreError) -> (StatusCode, &'static str, String) {
    match err {
        CoreError::NotFound { entity, id } => (
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            format!("{entity} with id {id} not found"),
        ),
        CoreError::ReferenceNotFound { entity, reference } => (
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            format!("{entity} with reference {reference} not found"),
        ),
        CoreError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
        CoreError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg.clone()),
        CoreError::Rejected(msg) => (StatusCode::UNPROCESSABLE_ENTITY, "REJECTED", msg.clone()),
        CoreError::InvalidTransition { .. } => {
            (StatusCode::CONFLICT, "INVALID_TRANSITION", err.to_string())
        }
        CoreError::Internal(msg) => {
            tracing::error!(error = %msg, "Internal core error");
            internal()
        }
    }
}

/// Classify a sqlx error into an HTTP status, error code, and message.
///
/// - A second live link on a seat maps to 409.
/// - Other unique violations (constraint name starting with `uq_`) map to 409.
/// - Everything else maps to 500 with a sanitized message.
fn classify_sqlx_error(err: &sqlx::Error) -> (StatusCode, &'static str, String) {
    if is_seat_ownership_violation(err) {
        return (
            StatusCode::CONFLICT,
            "CONFLICT",
            "Seat is already held by another booking".to_string(),
        );
    }
    if let sqlx::Error::Database(db_err) = err {
        if db_err.code().as_deref() == Some("23505") {
            let constraint = db_err.constraint().unwrap_or("unknown");
            if constraint.starts_with("uq_") {
                return (
                    StatusCode::CONFLICT,
                    "CONFLICT",
                    format!("Duplicate value violates unique constraint: {constraint}"),
                );
            }
        }
    }
    tracing::error!(error = %err, "Database error");
    internal()
}

fn internal() -> (StatusCode, &'static str, String) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "INTERNAL_ERROR",
        "An internal error occurred".to_string(),
    )
}
