//! Shared application state injected into all handlers.

use std::sync::Arc;

use crate::application::services::LinkService;
use crate::domain::clock::Clock;
use crate::domain::repositories::RecordStore;
use crate::domain::writeback::{WritebackMode, WritebackQueue};

#[derive(Clone)]
pub struct AppState {
    pub link_service: Arc<LinkService>,
    /// Used by the health check.
    pub store: Arc<dyn RecordStore>,
    pub writeback: WritebackQueue,
    pub writeback_mode: WritebackMode,
}

impl AppState {
    /// Wires the link service over the given store, clock and write-behind queue.
    pub fn new(
        store: Arc<dyn RecordStore>,
        clock: Arc<dyn Clock>,
        writeback: WritebackQueue,
        writeback_mode: WritebackMode,
    ) -> Self {
        let link_service = Arc::new(LinkService::new(store.clone(), clock, writeback.clone()));

        Self {
            link_service,
            store,
            writeback,
            writeback_mode,
        }
    }
}
