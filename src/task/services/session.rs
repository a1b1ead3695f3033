//! Session-scoped task store: load, sync, promotion and mutations.
//!
//! A [`TaskSession`] is created when a user session starts and dropped (or
//! [`TaskSession::close`]d) when it ends. It owns the cached task table and
//! the "promotion already ran" guard. Operations run one at a time: each
//! one reads the cached table, applies a transition and pushes the whole
//! table back to the remote worksheet.
//!
//! Concurrent sessions against one worksheet are not coordinated; the last
//! whole-table write wins.

use super::retry::{RetryError, RetryPolicy, retry};
use crate::task::{
    domain::{
        MoveDirection, Priority, PromotionSummary, ReorderError, SchemaError, Task,
        TaskDomainError, TaskId, TaskTable, ZonedClock, normalize_with_repairs,
        promote_stale_tasks,
    },
    ports::{RemoteTable, RemoteTableError},
};
use chrono_tz::Tz;
use mockable::Clock;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Service-level errors for session operations.
///
/// All of these abort the current operation. Conditions that only warrant a
/// warning are reported through [`MutationOutcome`] and [`SyncStatus`].
#[derive(Debug, Error)]
pub enum TaskSessionError {
    /// Domain validation failed.
    #[error(transparent)]
    Domain(#[from] TaskDomainError),

    /// The worksheet could not be read. The session does not fall back to
    /// an empty table, since a later sync would erase the remote rows.
    #[error("failed to load task table: {0}")]
    Load(#[source] RetryError),

    /// The worksheet holds a value that cannot be coerced.
    #[error("worksheet is malformed: {0}")]
    Schema(#[from] SchemaError),
}

/// Result type for session operations.
pub type TaskSessionResult<T> = Result<T, TaskSessionError>;

/// Outcome of pushing the cached table to the remote worksheet.
#[derive(Debug, Clone)]
pub enum SyncStatus {
    /// The remote now matches the local table.
    Synced,
    /// Nothing needed writing.
    Skipped,
    /// The write failed; the local table is kept as the source of truth
    /// until the next successful sync.
    Failed(RetryError),
}

impl SyncStatus {
    /// Returns `true` when the write failed.
    #[must_use]
    pub const fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }

    /// Returns `true` when the write succeeded.
    #[must_use]
    pub const fn is_synced(&self) -> bool {
        matches!(self, Self::Synced)
    }
}

/// Outcome of a mutation.
#[derive(Debug, Clone)]
#[must_use]
pub enum MutationOutcome<T> {
    /// The mutation was applied locally.
    Applied {
        /// Operation-specific result.
        value: T,
        /// Whether the change reached the remote worksheet.
        sync: SyncStatus,
    },
    /// The target task no longer exists; nothing changed.
    StaleReference(TaskId),
}

impl<T> MutationOutcome<T> {
    /// Returns the applied value.
    #[must_use]
    pub const fn value(&self) -> Option<&T> {
        match self {
            Self::Applied { value, .. } => Some(value),
            Self::StaleReference(_) => None,
        }
    }

    /// Consumes the outcome, returning the applied value.
    #[must_use]
    pub fn into_value(self) -> Option<T> {
        match self {
            Self::Applied { value, .. } => Some(value),
            Self::StaleReference(_) => None,
        }
    }

    /// Returns the sync status of an applied mutation.
    #[must_use]
    pub const fn sync_status(&self) -> Option<&SyncStatus> {
        match self {
            Self::Applied { sync, .. } => Some(sync),
            Self::StaleReference(_) => None,
        }
    }

    /// Returns `true` when the target task was missing.
    #[must_use]
    pub const fn is_stale(&self) -> bool {
        matches!(self, Self::StaleReference(_))
    }
}

/// Outcome of [`TaskSession::run_auto_promotion`].
#[derive(Debug, Clone)]
pub enum PromotionRun {
    /// Promotion already ran in this session; nothing changed.
    AlreadyRan,
    /// Promotion ran.
    Completed {
        /// Tasks changed by the pass.
        summary: PromotionSummary,
        /// Whether the changes reached the remote worksheet.
        sync: SyncStatus,
    },
}

impl PromotionRun {
    /// Returns the pass summary when promotion ran.
    #[must_use]
    pub const fn summary(&self) -> Option<&PromotionSummary> {
        match self {
            Self::Completed { summary, .. } => Some(summary),
            Self::AlreadyRan => None,
        }
    }
}

/// Deployment settings for a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionSettings {
    /// Timezone used for timestamps and the day boundary.
    pub zone: Tz,
    /// Backoff for remote calls.
    pub retry: RetryPolicy,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            zone: Tz::UTC,
            retry: RetryPolicy::default(),
        }
    }
}

/// Per-session task store.
pub struct TaskSession<R, C>
where
    R: RemoteTable,
    C: Clock + Send + Sync,
{
    remote: Arc<R>,
    clock: ZonedClock<C>,
    retry: RetryPolicy,
    table: Option<TaskTable>,
    promotion_ran: bool,
}

impl<R, C> TaskSession<R, C>
where
    R: RemoteTable,
    C: Clock + Send + Sync,
{
    /// Starts a session. Nothing is read until the first operation.
    #[must_use]
    pub fn new(remote: Arc<R>, clock: Arc<C>, settings: SessionSettings) -> Self {
        Self {
            remote,
            clock: ZonedClock::new(clock, settings.zone),
            retry: settings.retry,
            table: None,
            promotion_ran: false,
        }
    }

    /// Returns the session clock.
    #[must_use]
    pub const fn clock(&self) -> &ZonedClock<C> {
        &self.clock
    }

    /// Returns the cached table without touching the remote.
    #[must_use]
    pub const fn cached(&self) -> Option<&TaskTable> {
        self.table.as_ref()
    }

    /// Returns whether auto-promotion has run in this session.
    #[must_use]
    pub const fn promotion_ran(&self) -> bool {
        self.promotion_ran
    }

    /// Ends the session, returning the final cached table.
    #[must_use]
    pub fn close(self) -> Option<TaskTable> {
        self.table
    }

    /// Returns the session's task table, reading the remote worksheet when
    /// nothing is cached or `force_refresh` is set.
    ///
    /// A missing worksheet is bootstrapped as an empty table and written
    /// back immediately.
    ///
    /// # Errors
    ///
    /// Returns [`TaskSessionError::Load`] when the worksheet cannot be read
    /// and [`TaskSessionError::Schema`] when it cannot be normalized. A
    /// previously cached table is kept in both cases.
    pub async fn load(&mut self, force_refresh: bool) -> TaskSessionResult<&TaskTable> {
        if force_refresh || self.table.is_none() {
            let fresh = self.fetch().await?;
            self.table = Some(fresh);
        } else {
            debug!("serving cached task table");
        }
        Ok(self.table.get_or_insert_with(TaskTable::new))
    }

    /// Writes the cached table to the remote worksheet.
    ///
    /// Failures are reported, not raised: the local table stays the source
    /// of truth until a later sync succeeds.
    pub async fn sync(&self) -> SyncStatus {
        let Some(table) = self.table.as_ref() else {
            debug!("nothing cached, skipping sync");
            return SyncStatus::Skipped;
        };
        let status = self.write(table).await;
        if let SyncStatus::Failed(err) = &status {
            warn!(error = %err, "cloud sync failed, keeping local task table");
        }
        status
    }

    /// Escalates stale tasks once per session.
    ///
    /// The first call applies the promotion rules for today's date in the
    /// session timezone and syncs when anything changed. Later calls return
    /// [`PromotionRun::AlreadyRan`].
    ///
    /// # Errors
    ///
    /// Returns the load errors of [`TaskSession::load`]. The guard is only
    /// set once the rules have been applied.
    pub async fn run_auto_promotion(&mut self) -> TaskSessionResult<PromotionRun> {
        if self.promotion_ran {
            debug!("auto-promotion already ran in this session");
            return Ok(PromotionRun::AlreadyRan);
        }
        let today = self.clock.today();
        let table = self.table_mut().await?;
        let summary = promote_stale_tasks(table, &today);
        self.promotion_ran = true;

        if summary.is_empty() {
            return Ok(PromotionRun::Completed {
                summary,
                sync: SyncStatus::Skipped,
            });
        }
        info!(
            promoted = summary.promoted.len(),
            carried_over = summary.carried_over.len(),
            %today,
            "auto-promoted stale tasks"
        );
        let sync = self.sync().await;
        Ok(PromotionRun::Completed { summary, sync })
    }

    /// Adds a new task at the top of the active list.
    ///
    /// # Errors
    ///
    /// Returns [`TaskSessionError::Domain`] when `text` is blank, or a load
    /// error.
    pub async fn add(
        &mut self,
        text: impl Into<String>,
        priority: Priority,
    ) -> TaskSessionResult<MutationOutcome<Task>> {
        let clock = self.clock.clone();
        let table = self.table_mut().await?;
        let sort_rank = table.max_sort_rank().saturating_add(1);
        let task = Task::new(text, priority, sort_rank, &clock)?;
        table.push(task.clone());
        info!(id = %task.id(), priority = %task.priority(), "added task");
        Ok(self.applied(task).await)
    }

    /// Flips a task between complete and incomplete.
    ///
    /// # Errors
    ///
    /// Returns a load error.
    pub async fn toggle(&mut self, id: &TaskId) -> TaskSessionResult<MutationOutcome<Task>> {
        let timestamp = self.clock.timestamp();
        let table = self.table_mut().await?;
        let Some(task) = table.get_mut(id) else {
            return Ok(stale_reference("toggle", id));
        };
        let completed = task.toggle_completed(timestamp);
        let updated = task.clone();
        info!(%id, completed, "toggled task");
        Ok(self.applied(updated).await)
    }

    /// Replaces a task's label and priority and clears its carried-over
    /// flag.
    ///
    /// # Errors
    ///
    /// Returns [`TaskSessionError::Domain`] when `text` is blank, or a load
    /// error.
    pub async fn edit(
        &mut self,
        id: &TaskId,
        text: impl Into<String>,
        priority: Priority,
    ) -> TaskSessionResult<MutationOutcome<Task>> {
        let table = self.table_mut().await?;
        let Some(task) = table.get_mut(id) else {
            return Ok(stale_reference("edit", id));
        };
        task.edit(text, priority)?;
        let updated = task.clone();
        info!(%id, priority = %updated.priority(), "edited task");
        Ok(self.applied(updated).await)
    }

    /// Removes a task, returning it.
    ///
    /// # Errors
    ///
    /// Returns a load error.
    pub async fn delete(&mut self, id: &TaskId) -> TaskSessionResult<MutationOutcome<Task>> {
        let table = self.table_mut().await?;
        let Some(removed) = table.remove(id) else {
            return Ok(stale_reference("delete", id));
        };
        info!(%id, "deleted task");
        Ok(self.applied(removed).await)
    }

    /// Moves an incomplete task one step in the active list.
    ///
    /// The value is `false` when the task is already at that edge of the
    /// list (or is complete); nothing is written in that case.
    ///
    /// # Errors
    ///
    /// Returns a load error.
    pub async fn move_task(
        &mut self,
        id: &TaskId,
        direction: MoveDirection,
    ) -> TaskSessionResult<MutationOutcome<bool>> {
        let table = self.table_mut().await?;
        match table.move_task(id, direction) {
            None => Ok(stale_reference("move", id)),
            Some(false) => {
                debug!(%id, ?direction, "task is already at the edge of the list");
                Ok(MutationOutcome::Applied {
                    value: false,
                    sync: SyncStatus::Skipped,
                })
            }
            Some(true) => {
                info!(%id, ?direction, "moved task");
                Ok(self.applied(true).await)
            }
        }
    }

    /// Ranks tasks from a full ordering of identifiers, first on top.
    ///
    /// The value is the number of tasks ranked. When any identifier is
    /// unknown nothing changes and the outcome names it.
    ///
    /// # Errors
    ///
    /// Returns [`TaskSessionError::Domain`] when an identifier is listed
    /// twice, or a load error.
    pub async fn reorder(&mut self, ids: &[TaskId]) -> TaskSessionResult<MutationOutcome<usize>> {
        let table = self.table_mut().await?;
        match table.reorder(ids) {
            Err(ReorderError::UnknownTask(missing)) => Ok(stale_reference("reorder", &missing)),
            Err(ReorderError::DuplicateTask(repeated)) => {
                Err(TaskDomainError::DuplicateTaskId(repeated).into())
            }
            Ok(count) => {
                info!(count, "reordered tasks");
                Ok(self.applied(count).await)
            }
        }
    }

    async fn table_mut(&mut self) -> TaskSessionResult<&mut TaskTable> {
        if self.table.is_none() {
            let fresh = self.fetch().await?;
            self.table = Some(fresh);
        }
        Ok(self.table.get_or_insert_with(TaskTable::new))
    }

    async fn fetch(&self) -> TaskSessionResult<TaskTable> {
        let remote = &*self.remote;
        match retry(&self.retry, "read", || remote.read_all()).await {
            Ok(raw) => {
                let normalized = normalize_with_repairs(&raw)?;
                debug!(tasks = normalized.table.len(), "loaded task table");
                if normalized.needs_write_back() {
                    info!(
                        assigned = normalized.assigned_ids.len(),
                        "writing back generated task identifiers"
                    );
                    if let SyncStatus::Failed(err) = self.write(&normalized.table).await {
                        warn!(error = %err, "failed to persist generated task identifiers");
                    }
                }
                Ok(normalized.table)
            }
            Err(RetryError::Remote(RemoteTableError::MissingTable(name))) => {
                info!(worksheet = %name, "worksheet missing, bootstrapping an empty table");
                let table = TaskTable::new();
                if let SyncStatus::Failed(err) = self.write(&table).await {
                    warn!(error = %err, "failed to persist bootstrapped worksheet");
                }
                Ok(table)
            }
            Err(err) => Err(TaskSessionError::Load(err)),
        }
    }

    async fn write(&self, table: &TaskTable) -> SyncStatus {
        let raw = table.to_raw();
        let remote = &*self.remote;
        match retry(&self.retry, "write", || remote.write_all(&raw)).await {
            Ok(()) => SyncStatus::Synced,
            Err(err) => SyncStatus::Failed(err),
        }
    }

    async fn applied<T>(&self, value: T) -> MutationOutcome<T> {
        let sync = self.sync().await;
        MutationOutcome::Applied { value, sync }
    }
}

fn stale_reference<T>(operation: &'static str, id: &TaskId) -> MutationOutcome<T> {
    warn!(operation, %id, "task no longer exists, ignoring");
    MutationOutcome::StaleReference(id.clone())
}
