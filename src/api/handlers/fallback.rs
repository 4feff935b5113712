//! Handlers for requests that match no route.

use crate::error::AppError;

/// Any path that is neither an endpoint nor a token.
pub async fn not_found_handler() -> AppError {
    AppError::not_found()
}

/// A known path requested with the wrong method.
pub async fn method_not_allowed_handler() -> AppError {
    AppError::MethodNotAllowed
}
