//! Shared fixtures for task unit tests.

use crate::task::{
    domain::{Cell, PersistedTaskData, Priority, RawTable, Task, TaskId, schema},
    ports::{RemoteTable, RemoteTableResult},
};
use chrono::{DateTime, Local, TimeZone, Utc};
use mockable::Clock;
use mockall::mock;
use std::sync::Mutex;

/// Clock pinned to an instant that tests can move.
pub struct FixedClock {
    now: Mutex<DateTime<Utc>>,
}

impl FixedClock {
    pub fn new(instant: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(instant),
        }
    }

    pub fn set(&self, instant: DateTime<Utc>) {
        *self.now.lock().expect("clock lock") = instant;
    }
}

impl Clock for FixedClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        *self.now.lock().expect("clock lock")
    }
}

pub fn utc(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, hour, minute, 0)
        .single()
        .expect("valid instant")
}

mock! {
    pub Remote {}

    #[async_trait::async_trait]
    impl RemoteTable for Remote {
        async fn read_all(&self) -> RemoteTableResult<RawTable>;
        async fn write_all(&self, table: &RawTable) -> RemoteTableResult<()>;
    }
}

/// Builds one canonical row.
pub fn row(
    id: &str,
    text: &str,
    priority: &str,
    completed: bool,
    created_at: &str,
    rank: Option<i64>,
) -> Vec<Cell> {
    vec![
        Cell::text(id),
        Cell::text(text),
        Cell::text(priority),
        Cell::Bool(completed),
        Cell::text(created_at),
        Cell::Empty,
        Cell::Bool(false),
        rank.map_or(Cell::Empty, Cell::Int),
    ]
}

/// Canonical header with the given rows.
pub fn canonical_table(rows: impl IntoIterator<Item = Vec<Cell>>) -> RawTable {
    rows.into_iter()
        .fold(RawTable::new(schema::COLUMNS), RawTable::with_row)
}

/// Builds a task directly, bypassing the clock.
pub fn stored_task(
    id: &str,
    priority: Priority,
    completed: bool,
    created_at: &str,
    sort_rank: i64,
) -> Task {
    Task::from_persisted(PersistedTaskData {
        id: TaskId::parse(id).expect("valid id"),
        text: format!("task {id}"),
        priority,
        completed,
        created_at: created_at.to_owned(),
        completed_at: None,
        was_auto_promoted: false,
        sort_rank,
    })
}

/// Parses a test identifier.
pub fn id(value: &str) -> TaskId {
    TaskId::parse(value).expect("valid id")
}
