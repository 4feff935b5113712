//! # linkgate
//!
//! A URL shortener whose links carry their own access rules, built with Axum and Redis.
//!
//! ## Architecture
//!
//! - **Domain Layer** ([`domain`]) - Records, the access policy, the store trait and write-behind
//! - **Application Layer** ([`application`]) - Link creation and resolution
//! - **Infrastructure Layer** ([`infrastructure`]) - Redis and in-memory record stores
//! - **API Layer** ([`api`]) - HTTP handlers, DTOs, and middleware
//!
//! ## Features
//!
//! - Per-link total access quota (`max_access`)
//! - Per-link hourly quota with a lazily reset window (`max_per_hour`)
//! - Expiry after a period of inactivity (`max_age`), refreshed by each access
//! - Asynchronous write-behind of access counters
//! - Rate limiting and structured logging
//!
//! ## Quick Start
//!
//! ```bash
//! export REDIS_URL="redis://localhost:6379/0"
//! cargo run
//!
//! curl -d "long_url=https://example.com&max_access=10" http://localhost:8080/create
//! ```
//!
//! ## Configuration
//!
//! Service configuration is loaded from environment variables via [`config::Config`].
//! See [`config`] module for available options.

pub mod api;
pub mod application;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod state;
pub mod utils;

pub mod config;
pub mod server;

pub mod routes;

pub use error::AppError;
pub use state::AppState;

/// Commonly used types for external consumers.
///
/// Re-exports frequently used types to simplify imports for library users
/// and integration tests.
pub mod prelude {
    pub use crate::application::services::{LinkService, Resolution};
    pub use crate::domain::entities::{Limit, NewLink, UrlRecord};
    pub use crate::error::AppError;
    pub use crate::state::AppState;
}
