//! Shared fixtures for in-memory session tests.

use crate::test_helpers::{FixedClock, instant};
use rstest::fixture;
use std::sync::Arc;
use taskmaster::task::{
    adapters::memory::InMemoryRemoteTable,
    ports::RemoteTable,
    services::{RetryPolicy, SessionSettings, TaskSession},
};

/// Session type over the in-memory worksheet.
pub type MemorySession = TaskSession<InMemoryRemoteTable, FixedClock>;

/// Provides a clock reading 2024-01-01 10:00 UTC.
#[fixture]
pub fn clock() -> Arc<FixedClock> {
    Arc::new(FixedClock::new(instant(2024, 1, 1, 10, 0)))
}

/// Provides a worksheet handle that has not been created yet.
#[fixture]
pub fn worksheet() -> InMemoryRemoteTable {
    InMemoryRemoteTable::new("Tasks")
}

/// Settings that retry without sleeping.
pub fn fast_settings() -> SessionSettings {
    SessionSettings {
        retry: RetryPolicy::immediate(3),
        ..SessionSettings::default()
    }
}

/// Opens a session over `remote` using `clock`.
pub fn open_session<R: RemoteTable>(
    remote: &Arc<R>,
    clock: &Arc<FixedClock>,
) -> TaskSession<R, FixedClock> {
    TaskSession::new(Arc::clone(remote), Arc::clone(clock), fast_settings())
}

/// Collects the active task labels, top first.
pub fn active_labels<R: RemoteTable>(session: &TaskSession<R, FixedClock>) -> Vec<String> {
    session
        .cached()
        .map(|table| {
            table
                .active()
                .into_iter()
                .map(|task| task.text().to_owned())
                .collect()
        })
        .unwrap_or_default()
}
