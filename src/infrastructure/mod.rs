//! Infrastructure layer for external integrations.
//!
//! Implements the storage interface defined by the domain layer.
//!
//! # Modules
//!
//! - [`store`] - Record store implementations (Redis and in-memory)

pub mod store;
