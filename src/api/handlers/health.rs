//! Handler for health check endpoint.

use axum::{Json, extract::State, http::StatusCode};

use crate::api::dto::health::{CheckStatus, HealthChecks, HealthResponse};
use crate::state::AppState;

/// Returns service health status with component checks.
///
/// # Endpoint
///
/// `GET /health`
///
/// # Response Codes
///
/// - **200 OK**: All components healthy
/// - **503 Service Unavailable**: One or more components degraded
///
/// # Components Checked
///
/// 1. **Store**: Backend reachability (Redis PING)
/// 2. **Write-behind queue**: Channel open, free slots
///
/// # Response
///
/// ```json
/// {
///   "status": "healthy",
///   "version": "0.1.0",
///   "checks": {
///     "store": { "status": "ok", "message": "Store reachable" },
///     "writeback_queue": { "status": "ok", "message": "Free slots: 10000/10000" }
///   }
/// }
/// ```
pub async fn health_handler(
    State(state): State<AppState>,
) -> Result<Json<HealthResponse>, (StatusCode, Json<HealthResponse>)> {
    let store_check = if state.store.health_check().await {
        CheckStatus::ok("Store reachable")
    } else {
        CheckStatus::error("Store unreachable")
    };

    let queue_check = if state.writeback.is_closed() {
        CheckStatus::error("Write-behind queue is closed")
    } else {
        CheckStatus::ok(format!(
            "Free slots: {}/{}",
            state.writeback.capacity(),
            state.writeback.max_capacity()
        ))
    };

    let all_healthy = store_check.is_ok() && queue_check.is_ok();

    let response = HealthResponse {
        status: if all_healthy { "healthy" } else { "degraded" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        checks: HealthChecks {
            store: store_check,
            writeback_queue: queue_check,
        },
    };

    if all_healthy {
        Ok(Json(response))
    } else {
        Err((StatusCode::SERVICE_UNAVAILABLE, Json(response)))
    }
}
