//! Repository trait for short-URL record storage.

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

use crate::domain::entities::UrlRecord;

/// Errors raised by record store implementations.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store connection error: {0}")]
    Connection(String),

    #[error("store operation failed: {0}")]
    Operation(String),

    #[error("record serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Key-value storage of [`UrlRecord`]s keyed by token, with per-key expiry.
///
/// There is no transaction spanning `get` and `set`: two callers that read the
/// same record and write back their own copy race, and the last write wins.
///
/// # Implementations
///
/// - [`crate::infrastructure::store::RedisRecordStore`] - Redis, expiry via `PSETEX`
/// - [`crate::infrastructure::store::MemoryRecordStore`] - In-process map driven by a [`crate::domain::clock::Clock`]
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Loads the live record stored under `token`.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(record))` if present and not expired
    /// - `Ok(None)` if absent or expired
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the backend is unreachable or the stored
    /// payload cannot be decoded.
    async fn get(&self, token: &str) -> Result<Option<UrlRecord>, StoreError>;

    /// Writes `record` under `token`, replacing any previous value.
    ///
    /// The key expires `ttl` after this call, whatever its previous deadline was.
    async fn set(&self, token: &str, record: &UrlRecord, ttl: Duration) -> Result<(), StoreError>;

    /// Removes the record. Returns `true` if a record was removed.
    async fn delete(&self, token: &str) -> Result<bool, StoreError>;

    /// Checks if the backend is reachable.
    async fn health_check(&self) -> bool;
}
