//! Shared clock and worksheet builders for integration tests.

use chrono::{DateTime, Local, TimeZone, Utc};
use mockable::Clock;
use std::sync::Mutex;
use taskmaster::task::domain::{Cell, RawTable, schema};

/// Clock pinned to an instant that scenarios can advance.
#[derive(Debug)]
pub struct FixedClock {
    now: Mutex<DateTime<Utc>>,
}

impl FixedClock {
    /// Creates a clock reading `instant`.
    pub fn new(instant: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(instant),
        }
    }

    /// Moves the clock to `instant`.
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

/// Builds a UTC instant at minute precision.
pub fn instant(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, hour, minute, 0)
        .single()
        .expect("valid instant")
}

/// Builds a canonical worksheet row for an incomplete task.
pub fn open_row(id: &str, text: &str, priority: &str, created_at: &str, rank: i64) -> Vec<Cell> {
    vec![
        Cell::text(id),
        Cell::text(text),
        Cell::text(priority),
        Cell::Bool(false),
        Cell::text(created_at),
        Cell::Empty,
        Cell::Bool(false),
        Cell::Int(rank),
    ]
}

/// Builds a canonical worksheet from rows.
pub fn worksheet(rows: impl IntoIterator<Item = Vec<Cell>>) -> RawTable {
    rows.into_iter()
        .fold(RawTable::new(schema::COLUMNS), RawTable::with_row)
}
