//! Write-behind persistence of access updates.
//!
//! After an allowed redirect the updated record is handed to a background
//! worker over a bounded channel instead of being written on the request path.
//! The response may therefore leave before the store write completes; a crash
//! in between loses that access-count update.
//!
//! # Flow
//!
//! 1. [`WritebackQueue::submit`] enqueues a [`PersistJob`] (non-blocking)
//! 2. [`run_writeback_worker`] applies jobs in FIFO order via [`RecordStore::set`]
//! 3. The outcome is reported on the job's [`WritebackTicket`] and failures are logged
//!
//! A single worker keeps writes for the same token in submission order.

use metrics::counter;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error, info, warn};

use crate::domain::entities::UrlRecord;
use crate::domain::repositories::{RecordStore, StoreError};

/// Why a write-behind job did not reach the store.
#[derive(Debug, Error)]
pub enum WritebackError {
    #[error("write-behind queue is full")]
    QueueFull,

    #[error("write-behind queue is closed")]
    QueueClosed,

    #[error("write-behind worker stopped before acknowledging the write")]
    WorkerGone,

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Whether redirects wait for their write-behind job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WritebackMode {
    /// Respond immediately; the write completes later.
    #[default]
    Background,
    /// Await the write before responding.
    Inline,
}

impl FromStr for WritebackMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "background" => Ok(Self::Background),
            "inline" => Ok(Self::Inline),
            other => Err(format!(
                "unknown write-behind mode '{other}' (expected 'background' or 'inline')"
            )),
        }
    }
}

/// A pending store write produced by an allowed access.
#[derive(Debug)]
pub struct PersistJob {
    pub token: String,
    pub record: UrlRecord,
    pub ttl: Duration,
    ack: oneshot::Sender<Result<(), WritebackError>>,
}

/// Handle on the outcome of one submitted job.
///
/// Dropping the ticket does not cancel the write.
#[derive(Debug)]
pub struct WritebackTicket {
    rx: oneshot::Receiver<Result<(), WritebackError>>,
}

impl WritebackTicket {
    /// Waits until the worker has applied (or failed to apply) the write.
    pub async fn wait(self) -> Result<(), WritebackError> {
        self.rx.await.unwrap_or(Err(WritebackError::WorkerGone))
    }
}

/// Sending side of the write-behind channel.
#[derive(Debug, Clone)]
pub struct WritebackQueue {
    tx: mpsc::Sender<PersistJob>,
}

impl WritebackQueue {
    /// Creates a queue holding at most `capacity` pending jobs.
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<PersistJob>) {
        let (tx, rx) = mpsc::channel(capacity);
        (Self { tx }, rx)
    }

    /// Enqueues a write of `record` under `token` with the given TTL.
    ///
    /// Never blocks. When the queue is full or closed the job is dropped,
    /// logged, and the returned ticket resolves to the corresponding error.
    pub fn submit(&self, token: String, record: UrlRecord, ttl: Duration) -> WritebackTicket {
        let (ack, rx) = oneshot::channel();
        let job = PersistJob {
            token,
            record,
            ttl,
            ack,
        };

        if let Err(err) = self.tx.try_send(job) {
            let (job, reason) = match err {
                mpsc::error::TrySendError::Full(job) => (job, WritebackError::QueueFull),
                mpsc::error::TrySendError::Closed(job) => (job, WritebackError::QueueClosed),
            };
            warn!(token = %job.token, error = %reason, "Dropping access update");
            counter!("linkgate_writeback_dropped_total").increment(1);
            let _ = job.ack.send(Err(reason));
        }

        WritebackTicket { rx }
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }

    /// Number of free slots in the queue.
    pub fn capacity(&self) -> usize {
        self.tx.capacity()
    }

    pub fn max_capacity(&self) -> usize {
        self.tx.max_capacity()
    }
}

/// Applies queued writes until every [`WritebackQueue`] handle is dropped.
pub async fn run_writeback_worker(mut rx: mpsc::Receiver<PersistJob>, store: Arc<dyn RecordStore>) {
    info!("Write-behind worker started");

    while let Some(job) = rx.recv().await {
        let PersistJob {
            token,
            record,
            ttl,
            ack,
        } = job;

        let result = store.set(&token, &record, ttl).await;

        match &result {
            Ok(()) => debug!(
                token = %token,
                access_count = record.current_access_count,
                "Access update persisted"
            ),
            Err(e) => {
                error!(token = %token, error = %e, "Failed to persist access update");
                counter!("linkgate_writeback_failures_total").increment(1);
            }
        }

        let _ = ack.send(result.map_err(WritebackError::from));
    }

    info!("Write-behind worker stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::{Limit, NewLink};
    use crate::domain::repositories::MockRecordStore;
    use chrono::Utc;

    fn test_record(token: &str) -> UrlRecord {
        UrlRecord::new(
            token.to_string(),
            NewLink {
                long_url: "https://example.com".to_string(),
                max_access: Limit::Unlimited,
                max_per_hour: Limit::Unlimited,
                max_age: Duration::from_secs(60),
            },
            Utc::now(),
        )
    }

    #[tokio::test]
    async fn test_worker_persists_job_and_acknowledges() {
        let mut store = MockRecordStore::new();
        store
            .expect_set()
            .withf(|token, record, ttl| {
                token == "abcd1234" && record.token == "abcd1234" && *ttl == Duration::from_secs(60)
            })
            .times(1)
            .returning(|_, _, _| Ok(()));

        let (queue, rx) = WritebackQueue::channel(8);
        let worker = tokio::spawn(run_writeback_worker(rx, Arc::new(store)));

        let ticket = queue.submit(
            "abcd1234".to_string(),
            test_record("abcd1234"),
            Duration::from_secs(60),
        );
        assert!(ticket.wait().await.is_ok());

        drop(queue);
        worker.await.unwrap();
    }

    #[tokio::test]
    async fn test_worker_reports_store_failure() {
        let mut store = MockRecordStore::new();
        store
            .expect_set()
            .times(1)
            .returning(|_, _, _| Err(StoreError::Connection("refused".to_string())));

        let (queue, rx) = WritebackQueue::channel(8);
        tokio::spawn(run_writeback_worker(rx, Arc::new(store)));

        let ticket = queue.submit(
            "failing1".to_string(),
            test_record("failing1"),
            Duration::from_secs(60),
        );

        assert!(matches!(
            ticket.wait().await,
            Err(WritebackError::Store(StoreError::Connection(_)))
        ));
    }

    #[tokio::test]
    async fn test_submit_to_full_queue_drops_job() {
        let (queue, _rx) = WritebackQueue::channel(1);

        let _first = queue.submit("first001".to_string(), test_record("first001"), Duration::from_secs(60));
        let second = queue.submit("second02".to_string(), test_record("second02"), Duration::from_secs(60));

        assert!(matches!(second.wait().await, Err(WritebackError::QueueFull)));
    }

    #[tokio::test]
    async fn test_submit_to_closed_queue_drops_job() {
        let (queue, rx) = WritebackQueue::channel(4);
        drop(rx);

        let ticket = queue.submit("closed01".to_string(), test_record("closed01"), Duration::from_secs(60));

        assert!(queue.is_closed());
        assert!(matches!(ticket.wait().await, Err(WritebackError::QueueClosed)));
    }

    #[tokio::test]
    async fn test_unprocessed_job_reports_worker_gone() {
        let (queue, mut rx) = WritebackQueue::channel(4);

        let ticket = queue.submit("pending1".to_string(), test_record("pending1"), Duration::from_secs(60));
        // Receive and discard the job without acknowledging it.
        let job = rx.recv().await.unwrap();
        drop(job);

        assert!(matches!(ticket.wait().await, Err(WritebackError::WorkerGone)));
    }

    #[test]
    fn test_writeback_mode_parsing() {
        assert_eq!("background".parse::<WritebackMode>(), Ok(WritebackMode::Background));
        assert_eq!("INLINE".parse::<WritebackMode>(), Ok(WritebackMode::Inline));
        assert!("sometimes".parse::<WritebackMode>().is_err());
    }
}
