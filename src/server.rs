//! HTTP server initialization and runtime setup.
//!
//! Handles store connection, write-behind worker spawning, and Axum server lifecycle.

use crate::config::{Config, StoreBackend};
use crate::domain::clock::{Clock, SystemClock};
use crate::domain::repositories::RecordStore;
use crate::domain::writeback::{WritebackQueue, run_writeback_worker};
use crate::infrastructure::store::{MemoryRecordStore, RedisRecordStore};
use crate::routes::app_router;
use crate::state::AppState;

use anyhow::{Context, Result};
use axum::ServiceExt;
use axum::extract::Request;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

/// How long shutdown waits for pending access updates to be written.
const WRITEBACK_DRAIN_TIMEOUT: Duration = Duration::from_secs(10);

/// Opens the record store selected by the configuration.
///
/// # Errors
///
/// Returns an error if Redis stays unreachable after all configured attempts.
pub async fn connect_store(config: &Config, clock: Arc<dyn Clock>) -> Result<Arc<dyn RecordStore>> {
    let store: Arc<dyn RecordStore> = match config.store_backend {
        StoreBackend::Redis => {
            let redis = RedisRecordStore::connect_with_retry(
                &config.redis_url,
                config.store_key_prefix.clone(),
                config.redis_connect_retries,
            )
            .await
            .context("Failed to connect to Redis")?;
            tracing::info!("Record store: Redis");
            Arc::new(redis)
        }
        StoreBackend::Memory => {
            tracing::warn!("Record store: in-memory (records are lost on restart)");
            Arc::new(MemoryRecordStore::new(clock))
        }
    };

    Ok(store)
}

/// Runs the HTTP server with the given configuration.
///
/// Initializes:
/// - Record store (Redis or in-memory)
/// - Background write-behind worker
/// - Axum HTTP server with graceful shutdown
///
/// On shutdown, pending access updates are flushed before returning.
///
/// # Errors
///
/// Returns an error if:
/// - Store connection fails
/// - Server bind fails
/// - Server runtime error occurs
pub async fn run(config: Config) -> Result<()> {
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let store = connect_store(&config, clock.clone()).await?;

    let (writeback, writeback_rx) = WritebackQueue::channel(config.writeback_queue_capacity);
    let worker = tokio::spawn(run_writeback_worker(writeback_rx, store.clone()));
    tracing::info!("Write-behind worker spawned");

    let state = AppState::new(store, clock, writeback, config.writeback_mode);
    let app = app_router(state);

    let addr: SocketAddr = config
        .listen_addr
        .parse()
        .with_context(|| format!("Invalid listen address '{}'", config.listen_addr))?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Listening on http://{addr}");

    axum::serve(
        listener,
        ServiceExt::<Request>::into_make_service_with_connect_info::<SocketAddr>(app),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    // The router owned the last queue handles; the worker exits once the queue drains.
    match tokio::time::timeout(WRITEBACK_DRAIN_TIMEOUT, worker).await {
        Ok(Ok(())) => tracing::info!("Pending access updates flushed"),
        Ok(Err(e)) => tracing::error!(error = %e, "Write-behind worker panicked"),
        Err(_) => tracing::warn!("Timed out flushing pending access updates"),
    }

    Ok(())
}

/// Resolves on Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
