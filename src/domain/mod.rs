//! Domain layer containing business entities and logic.
//!
//! # Architecture
//!
//! - [`entities`] - Core business data structures
//! - [`policy`] - Access policy evaluation (total and hourly limits)
//! - [`repositories`] - Record store trait definition
//! - [`clock`] - Injectable time source
//! - [`writeback`] - Asynchronous persistence of access updates
//!
//! # Design Principles
//!
//! - Domain layer has no dependencies on infrastructure or presentation layers
//! - The policy evaluator is pure; all store I/O happens in
//!   [`crate::application::services`]
//!
//! # Redirect Flow
//!
//! 1. HTTP handler asks [`crate::application::services::LinkService`] to resolve a token
//! 2. The record is loaded via [`repositories::RecordStore`]
//! 3. [`policy::evaluate`] decides whether access is allowed
//! 4. The updated record is queued on [`writeback::WritebackQueue`]
//! 5. [`writeback::run_writeback_worker`] persists it in the background

pub mod clock;
pub mod entities;
pub mod policy;
pub mod repositories;
pub mod writeback;
