//! Record storage backends.
//!
//! Provides two implementations of [`crate::domain::repositories::RecordStore`]:
//! - [`RedisRecordStore`] - Production Redis-backed store
//! - [`MemoryRecordStore`] - In-process store for development and tests

mod memory_store;
mod redis_store;

pub use memory_store::MemoryRecordStore;
pub use redis_store::RedisRecordStore;
