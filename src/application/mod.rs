//! Application layer services implementing business logic.
//!
//! Services coordinate the record store, the clock, the access policy and the
//! write-behind queue, and give HTTP handlers and the admin CLI a small API.
//!
//! # Available Services
//!
//! - [`services::link_service::LinkService`] - Short link creation and resolution

pub mod services;
