//! Application services for the task tracker.

pub mod retry;
mod session;

pub use retry::{RetryError, RetryPolicy, retry};
pub use session::{
    MutationOutcome, PromotionRun, SessionSettings, SyncStatus, TaskSession, TaskSessionError,
    TaskSessionResult,
};
