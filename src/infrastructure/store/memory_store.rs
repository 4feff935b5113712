//! In-process record store for development and tests.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::Duration;
use tracing::debug;

use crate::domain::clock::Clock;
use crate::domain::entities::UrlRecord;
use crate::domain::repositories::{RecordStore, StoreError};

/// Stored payload and its absolute deadline.
#[derive(Debug, Clone)]
struct Entry {
    payload: String,
    expires_at: DateTime<Utc>,
}

impl Entry {
    fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

/// A record store backed by a `HashMap`, with expiry driven by a [`Clock`].
///
/// Records are kept in their encoded JSON form so reads go through the same
/// decoding as the Redis store. An expired entry is dropped when it is read,
/// and every write sweeps all expired entries.
///
/// Not durable: everything is lost when the process exits.
pub struct MemoryRecordStore {
    entries: RwLock<HashMap<String, Entry>>,
    clock: Arc<dyn Clock>,
}

impl MemoryRecordStore {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        debug!("Using in-memory record store");
        Self {
            entries: RwLock::new(HashMap::new()),
            clock,
        }
    }

    /// Number of live (non-expired) records.
    pub fn live_count(&self) -> usize {
        let now = self.clock.now();
        self.entries
            .read()
            .map(|entries| entries.values().filter(|e| !e.is_expired(now)).count())
            .unwrap_or(0)
    }

    /// Deadline of the record stored under `token`, if live.
    pub fn expires_at(&self, token: &str) -> Option<DateTime<Utc>> {
        let now = self.clock.now();
        let entries = self.entries.read().ok()?;
        entries
            .get(token)
            .filter(|e| !e.is_expired(now))
            .map(|e| e.expires_at)
    }
}

fn poisoned() -> StoreError {
    StoreError::Operation("in-memory store lock poisoned".to_string())
}

#[async_trait]
impl RecordStore for MemoryRecordStore {
    async fn get(&self, token: &str) -> Result<Option<UrlRecord>, StoreError> {
        let now = self.clock.now();

        let entry = {
            let entries = self.entries.read().map_err(|_| poisoned())?;
            entries.get(token).cloned()
        };

        match entry {
            Some(entry) if entry.is_expired(now) => {
                let mut entries = self.entries.write().map_err(|_| poisoned())?;
                // Re-check under the write lock: a concurrent set may have refreshed it.
                if entries.get(token).is_some_and(|e| e.is_expired(now)) {
                    entries.remove(token);
                }
                Ok(None)
            }
            Some(entry) => Ok(Some(UrlRecord::decode(&entry.payload)?)),
            None => Ok(None),
        }
    }

    async fn set(&self, token: &str, record: &UrlRecord, ttl: Duration) -> Result<(), StoreError> {
        let payload = record.encode()?;
        let ttl = chrono::Duration::from_std(ttl)
            .map_err(|e| StoreError::Operation(format!("TTL out of range: {}", e)))?;
        let now = self.clock.now();
        let expires_at = now + ttl;

        let mut entries = self.entries.write().map_err(|_| poisoned())?;
        // Keys that are never read again would otherwise stay forever.
        entries.retain(|_, e| !e.is_expired(now));
        entries.insert(
            token.to_string(),
            Entry {
                payload,
                expires_at,
            },
        );

        Ok(())
    }

    async fn delete(&self, token: &str) -> Result<bool, StoreError> {
        let now = self.clock.now();
        let mut entries = self.entries.write().map_err(|_| poisoned())?;

        Ok(entries.remove(token).is_some_and(|e| !e.is_expired(now)))
    }

    async fn health_check(&self) -> bool {
        !self.entries.is_poisoned()
    }
}
