//! Error types for task domain validation and parsing.

use super::TaskId;
use thiserror::Error;

/// Errors returned while constructing domain task values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TaskDomainError {
    /// The task text is empty after trimming.
    #[error("task text must not be empty")]
    EmptyTaskText,

    /// The task identifier is empty after trimming.
    #[error("task identifier must not be empty")]
    EmptyTaskId,

    /// An ordering names the same task more than once.
    #[error("task {0} is listed more than once")]
    DuplicateTaskId(TaskId),
}

/// Errors returned by [`TaskTable::reorder`](super::TaskTable::reorder).
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ReorderError {
    /// The ordering names a task that does not exist.
    #[error("task {0} does not exist")]
    UnknownTask(TaskId),

    /// The ordering names a task more than once.
    #[error("task {0} is listed more than once")]
    DuplicateTask(TaskId),
}

/// Error returned while parsing a priority from user input.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown priority: {0}, expected High, Medium or Low")]
pub struct ParsePriorityError(pub String);

/// Error returned while parsing a move direction from user input.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown move direction: {0}, expected up or down")]
pub struct ParseMoveDirectionError(pub String);

/// Errors returned while coercing a raw table cell into a typed value.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ParseCellError {
    /// The cell holds text outside the accepted boolean spellings.
    #[error("expected a boolean, found '{0}'")]
    NotBoolean(String),

    /// The cell cannot be read as a whole-number rank.
    #[error("expected a number, found '{0}'")]
    NotNumber(String),
}
