//! Handler for short URL redirect.

use axum::{
    extract::{Path, State},
    response::Redirect,
};
use metrics::counter;
use tracing::warn;

use crate::application::services::Resolution;
use crate::domain::writeback::WritebackMode;
use crate::error::AppError;
use crate::state::AppState;

/// Redirects a token to its long URL.
///
/// # Endpoint
///
/// `GET /{token}`
///
/// # Request Flow
///
/// 1. Load the record for the token
/// 2. Evaluate total and hourly access limits
/// 3. Queue the updated counters for write-behind persistence
/// 4. Return 307 Temporary Redirect
///
/// # Write-behind
///
/// In [`WritebackMode::Background`] the response is sent without waiting for
/// the store write. In [`WritebackMode::Inline`] the handler waits for it; a
/// failed write is logged and the redirect is still returned.
///
/// # Errors
///
/// Returns 404 Not Found if the token is unknown or expired.
/// Returns 400 Bad Request if the total or hourly access limit is reached.
pub async fn redirect_handler(
    Path(token): Path<String>,
    State(state): State<AppState>,
) -> Result<Redirect, AppError> {
    let Resolution {
        long_url,
        writeback,
    } = match state.link_service.resolve(&token).await {
        Ok(resolution) => {
            counter!("linkgate_redirects_total", "outcome" => "allowed").increment(1);
            resolution
        }
        Err(err) => {
            let outcome = match &err {
                AppError::NotFound(_) => "not_found",
                AppError::LimitExceeded(rejection) => rejection.as_label(),
                _ => "error",
            };
            counter!("linkgate_redirects_total", "outcome" => outcome).increment(1);
            return Err(err);
        }
    };

    if state.writeback_mode == WritebackMode::Inline
        && let Err(e) = writeback.wait().await
    {
        warn!(token = %token, error = %e, "Access update not persisted");
    }

    Ok(Redirect::temporary(&long_url))
}
