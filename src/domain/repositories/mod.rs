//! Repository trait definitions for the domain layer.
//!
//! Implementations live in `crate::infrastructure::store`; a mock is generated
//! via `mockall` for unit tests.

pub mod record_store;

pub use record_store::{RecordStore, StoreError};

#[cfg(test)]
pub use record_store::MockRecordStore;
