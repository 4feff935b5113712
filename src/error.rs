//! Application error type and its HTTP mapping.
//!
//! Every error renders as `{"message": "..."}`:
//!
//! | Variant | Status |
//! |---------|--------|
//! | [`AppError::Validation`] | 400 |
//! | [`AppError::NotFound`] | 404 |
//! | [`AppError::LimitExceeded`] | 400 |
//! | [`AppError::MethodNotAllowed`] | 405 |
//! | [`AppError::UnusableTarget`] | 500 |
//! | [`AppError::Store`] | 500 |

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;
use validator::ValidationErrors;

use crate::domain::policy::Rejection;
use crate::domain::repositories::StoreError;

/// Message returned when a token is unknown or its record has expired.
pub const NOT_FOUND_MESSAGE: &str =
    "Error finding your short URL. It may have expired or never existed.";

#[derive(Serialize)]
struct ErrorBody {
    message: String,
}

#[derive(Debug, Error)]
pub enum AppError {
    /// Missing or malformed request input. No side effects.
    #[error("{0}")]
    Validation(String),

    /// Token absent or expired.
    #[error("{0}")]
    NotFound(String),

    /// A total or hourly access cap was hit.
    #[error("{0}")]
    LimitExceeded(Rejection),

    #[error("Method not allowed")]
    MethodNotAllowed,

    /// The stored long URL cannot be sent as a `Location` header.
    #[error("Stored URL cannot be used as a redirect target")]
    UnusableTarget,

    /// Backing store unreachable or record unreadable.
    #[error("storage error: {0}")]
    Store(#[from] StoreError),
}

impl AppError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn not_found() -> Self {
        Self::NotFound(NOT_FOUND_MESSAGE.to_string())
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation(_) | Self::LimitExceeded(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            Self::UnusableTarget | Self::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<ValidationErrors> for AppError {
    fn from(errors: ValidationErrors) -> Self {
        let message = errors
            .field_errors()
            .values()
            .flat_map(|errs| errs.iter())
            .find_map(|e| e.message.as_ref().map(|m| m.to_string()))
            .unwrap_or_else(|| "Invalid request".to_string());

        Self::Validation(message)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let message = match self {
            Self::Store(e) => {
                tracing::error!(error = %e, "Store error while handling request");
                "Internal storage error".to_string()
            }
            other => other.to_string(),
        };

        (status, Json(ErrorBody { message })).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[derive(Validate)]
    struct Probe {
        #[validate(range(min = 1, max = 10, message = "Invalid probe parameter"))]
        value: i64,
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(
            AppError::bad_request("nope").status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(AppError::not_found().status_code(), StatusCode::NOT_FOUND);
        assert_eq!(
            AppError::LimitExceeded(Rejection::MaxPerHourReached).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::MethodNotAllowed.status_code(),
            StatusCode::METHOD_NOT_ALLOWED
        );
        assert_eq!(
            AppError::UnusableTarget.status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            AppError::from(StoreError::Connection("down".to_string())).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_messages() {
        assert_eq!(AppError::bad_request("Missing long_url parameter").to_string(), "Missing long_url parameter");
        assert_eq!(AppError::not_found().to_string(), NOT_FOUND_MESSAGE);
        assert_eq!(
            AppError::LimitExceeded(Rejection::MaxAccessReached).to_string(),
            "Max access reached"
        );
    }

    #[test]
    fn test_validation_errors_use_field_message() {
        let errors = Probe { value: 0 }.validate().unwrap_err();

        let err = AppError::from(errors);

        assert!(matches!(err, AppError::Validation(ref m) if m == "Invalid probe parameter"));
    }
}
