use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Serialize;
use thiserror::Error;
use tracing::error;
use validator::ValidationErrors;

use crate::{auth::AuthError, dao::storage::StorageError};

const BAD_REQUEST_MESSAGE: &str = "You have provided an invalid request payload.";
const UNAUTHORIZED_MESSAGE: &str = "Unauthorized";
const NOT_FOUND_MESSAGE: &str = "Resource not found.";
const UNAVAILABLE_MESSAGE: &str = "Service temporarily unavailable.";
const INTERNAL_MESSAGE: &str = "An internal server error occurred.";

/// Errors that can occur in service layer operations.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Required fields are missing or out of range.
    #[error("invalid payload: {0}")]
    InvalidPayload(String),
    /// Caller could not be authenticated.
    #[error("unauthorized: {0}")]
    Unauthorized(String),
    /// Referenced game does not exist (or is not visible to the caller).
    #[error("not found: {0}")]
    NotFound(String),
    /// Storage backend failed while serving the request.
    #[error("storage failure")]
    Storage(#[source] StorageError),
    /// Application is running without a connected store.
    #[error("storage unavailable (degraded mode)")]
    Degraded,
}

impl From<StorageError> for ServiceError {
    fn from(err: StorageError) -> Self {
        ServiceError::Storage(err)
    }
}

impl From<ValidationErrors> for ServiceError {
    fn from(err: ValidationErrors) -> Self {
        ServiceError::InvalidPayload(format!("validation failed: {err}"))
    }
}

impl From<AuthError> for ServiceError {
    fn from(err: AuthError) -> Self {
        ServiceError::Unauthorized(err.to_string())
    }
}

/// Application-level errors that are converted to HTTP responses.
#[derive(Debug, Error)]
pub enum AppError {
    /// Bad request with invalid input.
    #[error("bad request: {0}")]
    BadRequest(String),
    /// Unauthorized access attempt.
    #[error("unauthorized: {0}")]
    Unauthorized(String),
    /// Requested resource not found.
    #[error("not found: {0}")]
    NotFound(String),
    /// Service unavailable or degraded.
    #[error("service unavailable: {0}")]
    ServiceUnavailable(String),
    /// Internal server error. The detail is logged and never sent to the client.
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<ServiceError> for AppError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::InvalidPayload(message) => AppError::BadRequest(message),
            ServiceError::Unauthorized(message) => AppError::Unauthorized(message),
            ServiceError::NotFound(message) => AppError::NotFound(message),
            ServiceError::Storage(source) => AppError::Internal(error_chain(&source)),
            ServiceError::Degraded => AppError::ServiceUnavailable("degraded mode".into()),
        }
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        ServiceError::from(err).into()
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

fn error_chain(err: &(dyn std::error::Error + 'static)) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

#[derive(Serialize)]
struct ErrorBody {
    message: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    detail: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let (status, message, detail) = match self {
            AppError::BadRequest(detail) => {
                (StatusCode::BAD_REQUEST, BAD_REQUEST_MESSAGE, Some(detail))
            }
            AppError::Unauthorized(_) => (StatusCode::UNAUTHORIZED, UNAUTHORIZED_MESSAGE, None),
            AppError::NotFound(detail) => (StatusCode::NOT_FOUND, NOT_FOUND_MESSAGE, Some(detail)),
            AppError::ServiceUnavailable(detail) => (
                StatusCode::SERVICE_UNAVAILABLE,
                UNAVAILABLE_MESSAGE,
                Some(detail),
            ),
            AppError::Internal(detail) => {
                error!(error = %detail, "request failed with an internal error");
                (StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_MESSAGE, None)
            }
        };

        (status, Json(ErrorBody { message, detail })).into_response()
    }
}
