//! Behaviour when the worksheet rejects writes.

use super::helpers::{clock, open_session};
use crate::test_helpers::{FixedClock, open_row, worksheet};
use rstest::rstest;
use async_trait::async_trait;
use std::sync::{
    Arc,
    atomic::{AtomicBool, AtomicU32, Ordering},
};
use taskmaster::task::{
    adapters::memory::InMemoryRemoteTable,
    domain::{Priority, RawTable},
    ports::{RemoteTable, RemoteTableError, RemoteTableResult, TransientKind},
    services::SyncStatus,
};

/// Worksheet that answers every write with a quota error while offline.
struct FlakyTable {
    inner: InMemoryRemoteTable,
    offline: AtomicBool,
    rejected_writes: AtomicU32,
}

impl FlakyTable {
    fn new(inner: InMemoryRemoteTable) -> Self {
        Self {
            inner,
            offline: AtomicBool::new(true),
            rejected_writes: AtomicU32::new(0),
        }
    }

    fn reconnect(&self) {
        self.offline.store(false, Ordering::SeqCst);
    }
}

#[async_trait]
impl RemoteTable for FlakyTable {
    async fn read_all(&self) -> RemoteTableResult<RawTable> {
        self.inner.read_all().await
    }

    async fn write_all(&self, table: &RawTable) -> RemoteTableResult<()> {
        if self.offline.load(Ordering::SeqCst) {
            self.rejected_writes.fetch_add(1, Ordering::SeqCst);
            return Err(RemoteTableError::transient(
                TransientKind::ResourceExhausted,
                "write quota exhausted",
            ));
        }
        self.inner.write_all(table).await
    }
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn local_changes_survive_until_the_next_successful_sync(clock: Arc<FixedClock>) {
    let backing = InMemoryRemoteTable::with_table(
        "Tasks",
        worksheet([open_row("1", "Existing", "Low", "2024-01-01 09:00:00.000000", 1)]),
    );
    let remote = Arc::new(FlakyTable::new(backing.clone()));
    let mut session = open_session(&remote, &clock);

    let outcome = session
        .add("Written offline", Priority::High)
        .await
        .expect("add applies locally");

    assert!(outcome.sync_status().is_some_and(SyncStatus::is_failed));
    assert_eq!(remote.rejected_writes.load(Ordering::SeqCst), 3);
    assert_eq!(session.cached().map(|table| table.len()), Some(2));
    let stored = backing.snapshot().expect("readable").expect("exists");
    assert_eq!(stored.len(), 1);

    remote.reconnect();
    assert!(session.sync().await.is_synced());
    let synced = backing.snapshot().expect("readable").expect("exists");
    assert_eq!(synced.len(), 2);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn bootstrap_write_failure_still_yields_an_empty_table(clock: Arc<FixedClock>) {
    let remote = Arc::new(FlakyTable::new(InMemoryRemoteTable::new("Tasks")));
    let mut session = open_session(&remote, &clock);

    let table = session.load(false).await.expect("bootstrapped");

    assert!(table.is_empty());
    assert_eq!(remote.rejected_writes.load(Ordering::SeqCst), 3);
}
