#![allow(dead_code)]

use axum_test::TestServer;
use chrono::{TimeZone, Utc};
use linkgate::domain::clock::ManualClock;
use linkgate::domain::writeback::{WritebackMode, WritebackQueue, run_writeback_worker};
use linkgate::infrastructure::store::MemoryRecordStore;
use linkgate::routes::routes;
use linkgate::state::AppState;
use std::sync::Arc;

pub struct TestApp {
    pub server: TestServer,
    pub store: Arc<MemoryRecordStore>,
    pub clock: Arc<ManualClock>,
}

/// State over an in-memory store and a manual clock.
///
/// Redirects wait for their write-behind job, so every request observes the
/// counters left by the previous one.
pub fn create_test_state() -> (AppState, Arc<MemoryRecordStore>, Arc<ManualClock>) {
    create_test_state_with_mode(WritebackMode::Inline)
}

pub fn create_test_state_with_mode(
    mode: WritebackMode,
) -> (AppState, Arc<MemoryRecordStore>, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::new(
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap(),
    ));
    let store = Arc::new(MemoryRecordStore::new(clock.clone()));

    let (writeback, rx) = WritebackQueue::channel(100);
    tokio::spawn(run_writeback_worker(rx, store.clone()));

    let state = AppState::new(store.clone(), clock.clone(), writeback, mode);
    (state, store, clock)
}

pub fn test_app() -> TestApp {
    test_app_with_mode(WritebackMode::Inline)
}

pub fn test_app_with_mode(mode: WritebackMode) -> TestApp {
    let (state, store, clock) = create_test_state_with_mode(mode);
    let server = TestServer::new(routes(state)).unwrap();

    TestApp {
        server,
        store,
        clock,
    }
}

/// Creates a link through the API and returns its token.
pub async fn create_link(server: &TestServer, fields: &[(&str, &str)]) -> String {
    let response = server.post("/create").form(fields).await;
    response.assert_status_ok();

    let json = response.json::<serde_json::Value>();
    json["token"].as_str().unwrap().to_string()
}
