//! Data Transfer Objects for API requests and responses.
//!
//! Request DTOs are parsed from form bodies and validated with `validator`;
//! responses are serialized as JSON.

pub mod create;
pub mod health;
