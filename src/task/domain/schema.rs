//! Repairs and types raw worksheet rows into a [`TaskTable`].
//!
//! The worksheet may come from any schema generation: columns can be
//! missing, identifiers can be integers, flags can be spelled as text and
//! the sort rank column may be absent or partly blank. [`normalize`] fills
//! every gap with a default so the rest of the crate sees one shape.
//! Normalizing an already-normalized table yields the same table.

use super::{
    Cell, ParseCellError, PersistedTaskData, Priority, RawTable, Task, TaskId, TaskTable,
};
use thiserror::Error;
use tracing::{debug, warn};

/// Identifier column.
pub const ID: &str = "id";
/// Label column.
pub const TEXT: &str = "text";
/// Priority column.
pub const PRIORITY: &str = "priority";
/// Completion flag column.
pub const COMPLETED: &str = "completed";
/// Creation timestamp column.
pub const CREATED_AT: &str = "created_at";
/// Completion timestamp column.
pub const COMPLETED_AT: &str = "completed_at";
/// Carried-over flag column.
pub const WAS_AUTO_PROMOTED: &str = "was_auto_promoted";
/// Manual sort rank column.
pub const CUSTOM_SORT_INDEX: &str = "custom_sort_index";

/// Worksheet columns in canonical order.
pub const COLUMNS: [&str; 8] = [
    ID,
    TEXT,
    PRIORITY,
    COMPLETED,
    CREATED_AT,
    COMPLETED_AT,
    WAS_AUTO_PROMOTED,
    CUSTOM_SORT_INDEX,
];

/// Error returned when a worksheet cell cannot be coerced.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("row {row}, column '{column}': {source}")]
pub struct SchemaError {
    /// Zero-based data row.
    pub row: usize,
    /// Column holding the offending cell.
    pub column: &'static str,
    /// Coercion failure.
    #[source]
    pub source: ParseCellError,
}

/// Row fields read before sort ranks are backfilled.
struct PartialRow {
    data: PersistedTaskData,
    rank: Option<i64>,
    id_assigned: bool,
}

/// A normalized table plus the repairs that must be written back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Normalized {
    /// The typed task table.
    pub table: TaskTable,
    /// Identifiers generated for rows that had none. Until the table is
    /// written back, the next read would assign different ones.
    pub assigned_ids: Vec<TaskId>,
}

impl Normalized {
    /// Returns `true` when the worksheet must be rewritten to keep the
    /// repairs stable.
    #[must_use]
    pub const fn needs_write_back(&self) -> bool {
        !self.assigned_ids.is_empty()
    }
}

/// Normalizes a raw worksheet into a typed task table.
///
/// Rows with no values at all are skipped. Blank identifiers receive a
/// fresh one. When no row has a sort rank, ranks are assigned in
/// decreasing row order; when only some rows lack one, they receive the
/// current maximum.
///
/// # Errors
///
/// Returns [`SchemaError`] when a flag or rank cell holds a value outside
/// the accepted vocabulary.
pub fn normalize(raw: &RawTable) -> Result<TaskTable, SchemaError> {
    normalize_with_repairs(raw).map(|normalized| normalized.table)
}

/// Normalizes a raw worksheet like [`normalize`], also reporting the
/// identifiers it had to generate.
///
/// # Errors
///
/// Returns [`SchemaError`] under the same conditions as [`normalize`].
pub fn normalize_with_repairs(raw: &RawTable) -> Result<Normalized, SchemaError> {
    let missing: Vec<&str> = COLUMNS
        .iter()
        .copied()
        .filter(|column| raw.column_index(column).is_none())
        .collect();
    if !missing.is_empty() && !raw.is_empty() {
        debug!(columns = ?missing, "adding missing worksheet columns");
    }

    let mut rows = Vec::with_capacity(raw.len());
    for (index, cells) in raw.rows().iter().enumerate() {
        if cells.iter().all(Cell::is_missing) {
            debug!(row = index, "skipping blank worksheet row");
            continue;
        }
        rows.push(read_row(raw, index)?);
    }

    let assigned_ids = rows
        .iter()
        .filter(|row| row.id_assigned)
        .map(|row| row.data.id.clone())
        .collect();
    Ok(Normalized {
        table: TaskTable::from_tasks(backfill_ranks(rows)),
        assigned_ids,
    })
}

fn read_row(raw: &RawTable, row: usize) -> Result<PartialRow, SchemaError> {
    let (id, id_assigned) = match raw.cell(row, ID).render().map(TaskId::parse) {
        Some(Ok(id)) => (id, false),
        Some(Err(_)) | None => {
            let fresh = TaskId::new();
            warn!(row, id = %fresh, "worksheet row has no identifier, assigning one");
            (fresh, true)
        }
    };
    let priority = raw
        .cell(row, PRIORITY)
        .render()
        .map_or(Priority::default(), |value| Priority::from_stored(&value));
    let rank = raw
        .cell(row, CUSTOM_SORT_INDEX)
        .to_rank()
        .map_err(|source| SchemaError {
            row,
            column: CUSTOM_SORT_INDEX,
            source,
        })?;

    Ok(PartialRow {
        data: PersistedTaskData {
            id,
            text: raw.cell(row, TEXT).label().unwrap_or_default(),
            priority,
            completed: read_flag(raw, row, COMPLETED)?,
            created_at: raw.cell(row, CREATED_AT).render().unwrap_or_default(),
            completed_at: raw.cell(row, COMPLETED_AT).render(),
            was_auto_promoted: read_flag(raw, row, WAS_AUTO_PROMOTED)?,
            sort_rank: 0,
        },
        rank,
        id_assigned,
    })
}

fn read_flag(raw: &RawTable, row: usize, column: &'static str) -> Result<bool, SchemaError> {
    raw.cell(row, column)
        .to_bool()
        .map_err(|source| SchemaError {
            row,
            column,
            source,
        })
}

fn backfill_ranks(rows: Vec<PartialRow>) -> Vec<Task> {
    let existing_max = rows.iter().filter_map(|row| row.rank).max();
    let count = rows.len();
    rows.into_iter()
        .enumerate()
        .map(|(position, row)| {
            let sort_rank = match (row.rank, existing_max) {
                (Some(rank), _) => rank,
                (None, Some(max)) => max,
                (None, None) => {
                    i64::try_from(count.saturating_sub(position)).unwrap_or(i64::MAX)
                }
            };
            Task::from_persisted(PersistedTaskData {
                sort_rank,
                ..row.data
            })
        })
        .collect()
}
