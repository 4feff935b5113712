//! HTTP layer: request/response translation for the two public operations.
//!
//! # Modules
//!
//! - [`dto`] - Form parsing and JSON response types
//! - [`handlers`] - HTTP request handlers
//! - [`middleware`] - Rate limiting and request tracing

pub mod dto;
pub mod handlers;
pub mod middleware;
