//! Redis-backed record store.

use async_trait::async_trait;
use redis::{AsyncCommands, Client, RedisError, aio::ConnectionManager};
use std::time::Duration;
use tokio_retry::Retry;
use tokio_retry::strategy::{ExponentialBackoff, jitter};
use tracing::{debug, info, warn};

use crate::domain::entities::UrlRecord;
use crate::domain::repositories::{RecordStore, StoreError};

impl From<RedisError> for StoreError {
    fn from(e: RedisError) -> Self {
        if e.is_io_error() || e.is_connection_dropped() || e.is_connection_refusal() {
            StoreError::Connection(e.to_string())
        } else {
            StoreError::Operation(e.to_string())
        }
    }
}

/// Record store keeping each record as a JSON string with a millisecond TTL.
///
/// Uses `ConnectionManager` for automatic reconnection and connection reuse.
/// Every write is a `PSETEX`, so the key's deadline is reset to `ttl` from the
/// moment of the write.
pub struct RedisRecordStore {
    conn: ConnectionManager,
    key_prefix: String,
}

impl RedisRecordStore {
    /// Connects to Redis and validates the connection with a PING.
    ///
    /// # Arguments
    ///
    /// - `redis_url` - Redis connection string (e.g., `"redis://localhost:6379/0"`)
    /// - `key_prefix` - Prepended to every token to form the Redis key
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Connection`] if the URL is invalid, the connection
    /// cannot be established, or the PING fails.
    pub async fn connect(redis_url: &str, key_prefix: String) -> Result<Self, StoreError> {
        info!("Connecting to Redis");

        let client = Client::open(redis_url).map_err(|e| {
            StoreError::Connection(format!("Failed to create Redis client: {}", e))
        })?;

        let manager = ConnectionManager::new(client).await.map_err(|e| {
            StoreError::Connection(format!("Failed to connect to Redis: {}", e))
        })?;

        let mut test_conn = manager.clone();
        test_conn
            .ping::<()>()
            .await
            .map_err(|e| StoreError::Connection(format!("Redis PING failed: {}", e)))?;

        info!("✓ Connected to Redis");

        Ok(Self {
            conn: manager,
            key_prefix,
        })
    }

    /// Like [`Self::connect`], retrying with jittered exponential backoff.
    ///
    /// `attempts` is the total number of tries (at least one).
    pub async fn connect_with_retry(
        redis_url: &str,
        key_prefix: String,
        attempts: usize,
    ) -> Result<Self, StoreError> {
        let strategy = ExponentialBackoff::from_millis(2)
            .factor(50)
            .max_delay(Duration::from_secs(5))
            .map(jitter)
            .take(attempts.saturating_sub(1));

        Retry::start(strategy, || {
            let key_prefix = key_prefix.clone();
            async move {
                Self::connect(redis_url, key_prefix)
                    .await
                    .inspect_err(|e| warn!(error = %e, "Redis connection attempt failed"))
            }
        })
        .await
    }

    /// Constructs the full Redis key with namespace prefix.
    fn build_key(&self, token: &str) -> String {
        format!("{}{}", self.key_prefix, token)
    }
}

/// Converts a TTL to whole milliseconds, never below one.
fn ttl_millis(ttl: Duration) -> u64 {
    u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX).max(1)
}

#[async_trait]
impl RecordStore for RedisRecordStore {
    async fn get(&self, token: &str) -> Result<Option<UrlRecord>, StoreError> {
        let key = self.build_key(token);
        let mut conn = self.conn.clone();

        let raw = conn.get::<_, Option<String>>(&key).await?;

        match raw {
            Some(payload) => {
                debug!(token = %token, "Record found");
                Ok(Some(UrlRecord::decode(&payload)?))
            }
            None => {
                debug!(token = %token, "Record not found");
                Ok(None)
            }
        }
    }

    async fn set(&self, token: &str, record: &UrlRecord, ttl: Duration) -> Result<(), StoreError> {
        let key = self.build_key(token);
        let payload = record.encode()?;
        let mut conn = self.conn.clone();
        let millis = ttl_millis(ttl);

        conn.pset_ex::<_, _, ()>(&key, payload, millis).await?;
        debug!(token = %token, ttl_ms = millis, "Record written");

        Ok(())
    }

    async fn delete(&self, token: &str) -> Result<bool, StoreError> {
        let key = self.build_key(token);
        let mut conn = self.conn.clone();

        let deleted = conn.del::<_, i64>(&key).await?;
        if deleted > 0 {
            debug!(token = %token, "Record deleted");
        }

        Ok(deleted > 0)
    }

    async fn health_check(&self) -> bool {
        let mut conn = self.conn.clone();
        conn.ping::<()>().await.is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ttl_millis() {
        assert_eq!(ttl_millis(Duration::from_secs(3600)), 3_600_000);
        assert_eq!(ttl_millis(Duration::from_micros(10)), 1);
        assert_eq!(ttl_millis(Duration::ZERO), 1);
    }

    #[tokio::test]
    async fn test_connect_with_retry_gives_up_after_attempts() {
        let result = RedisRecordStore::connect_with_retry("not-a-redis-url", String::new(), 2).await;

        assert!(matches!(result, Err(StoreError::Connection(_))));
    }

    #[test]
    fn test_io_error_maps_to_connection() {
        let io = RedisError::from(std::io::Error::new(
            std::io::ErrorKind::ConnectionRefused,
            "refused",
        ));
        assert!(matches!(StoreError::from(io), StoreError::Connection(_)));
    }
}
