//! Top-level router configuration.
//!
//! # Route Structure
//!
//! - `POST /create`   - Create a short link (form body)
//! - `GET  /health`   - Health check: store, write-behind queue
//! - `GET  /{token}`  - Redirect to the long URL
//!
//! Unmatched paths get a JSON 404 and wrong methods a JSON 405.
//!
//! # Middleware
//!
//! - **Tracing** - Structured request/response logging
//! - **Rate limiting** - Per-IP token bucket
//! - **Path normalization** - Trailing slash handling

use crate::api::handlers::{
    create_handler, health_handler, method_not_allowed_handler, not_found_handler, redirect_handler,
};
use crate::api::middleware::{rate_limit, tracing};
use crate::state::AppState;
use axum::Router;
use axum::routing::{get, post};
use tower::Layer;
use tower_http::normalize_path::{NormalizePath, NormalizePathLayer};

/// Routes without middleware, shared by [`app_router`] and tests.
pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/create", post(create_handler))
        .route("/health", get(health_handler))
        .route("/{token}", get(redirect_handler))
        .fallback(not_found_handler)
        .method_not_allowed_fallback(method_not_allowed_handler)
        .with_state(state)
}

/// Constructs the application router with all routes and middleware.
///
/// The rate limiter keys on the peer address, so the returned service must be
/// served with connect info (see [`crate::server::run`]).
pub fn app_router(state: AppState) -> NormalizePath<Router> {
    let router = routes(state)
        .layer(rate_limit::layer())
        .layer(tracing::layer());

    NormalizePathLayer::trim_trailing_slash().layer(router)
}
