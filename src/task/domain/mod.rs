//! Domain model for the task tracker.
//!
//! The domain covers task rows, the worksheet cell vocabulary, schema
//! repair, ordering and the daily promotion rule. Infrastructure concerns
//! (the remote worksheet, retries, session caching) live outside this
//! boundary.

mod error;
mod ids;
mod promotion;
mod raw;
pub mod schema;
mod table;
mod task;
mod time;

pub use error::{
    ParseCellError, ParseMoveDirectionError, ParsePriorityError, ReorderError, TaskDomainError,
};
pub use ids::TaskId;
pub use promotion::{PromotionSummary, promote_stale_tasks};
pub use raw::{Cell, RawTable};
pub use schema::{Normalized, SchemaError, normalize, normalize_with_repairs};
pub use table::TaskTable;
pub use task::{MoveDirection, PersistedTaskData, Priority, Task};
pub use time::{DATE_FORMAT, TIMESTAMP_FORMAT, ZonedClock};
