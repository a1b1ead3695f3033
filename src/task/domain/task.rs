//! Task row type and related value types.

use super::{ParseMoveDirectionError, ParsePriorityError, TaskDomainError, TaskId, ZonedClock};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// Number of leading characters of a timestamp that form its date.
const DATE_PREFIX_LEN: usize = 10;

/// Task priority tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Priority {
    /// Highest tier; stale tasks are escalated here.
    High,
    /// Default tier.
    #[default]
    Medium,
    /// Lowest tier.
    Low,
}

impl Priority {
    /// All priorities from highest to lowest.
    pub const ALL: [Self; 3] = [Self::High, Self::Medium, Self::Low];

    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::High => "High",
            Self::Medium => "Medium",
            Self::Low => "Low",
        }
    }

    /// Reads a stored priority, falling back to [`Priority::Medium`] for
    /// unrecognized values.
    #[must_use]
    pub fn from_stored(value: &str) -> Self {
        Self::try_from(value).unwrap_or_default()
    }
}

impl TryFrom<&str> for Priority {
    type Error = ParsePriorityError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "high" => Ok(Self::High),
            "medium" => Ok(Self::Medium),
            "low" => Ok(Self::Low),
            _ => Err(ParsePriorityError(value.to_owned())),
        }
    }
}

impl FromStr for Priority {
    type Err = ParsePriorityError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::try_from(value)
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Direction for a single-step move in the active list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MoveDirection {
    /// Towards the top of the list.
    Up,
    /// Towards the bottom of the list.
    Down,
}

impl FromStr for MoveDirection {
    type Err = ParseMoveDirectionError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "up" => Ok(Self::Up),
            "down" => Ok(Self::Down),
            _ => Err(ParseMoveDirectionError(value.to_owned())),
        }
    }
}

/// A tracked task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    id: TaskId,
    text: String,
    priority: Priority,
    completed: bool,
    created_at: String,
    completed_at: Option<String>,
    was_auto_promoted: bool,
    sort_rank: i64,
}

/// Parameter object for reconstructing a persisted task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedTaskData {
    /// Persisted task identifier.
    pub id: TaskId,
    /// Persisted label.
    pub text: String,
    /// Persisted priority.
    pub priority: Priority,
    /// Persisted completion flag.
    pub completed: bool,
    /// Persisted creation timestamp, empty when unknown.
    pub created_at: String,
    /// Persisted completion timestamp.
    pub completed_at: Option<String>,
    /// Persisted carried-over flag.
    pub was_auto_promoted: bool,
    /// Persisted manual sort rank.
    pub sort_rank: i64,
}

impl Task {
    /// Creates a new incomplete task stamped with the current time.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::EmptyTaskText`] when `text` is blank.
    pub fn new<C: Clock>(
        text: impl Into<String>,
        priority: Priority,
        sort_rank: i64,
        clock: &ZonedClock<C>,
    ) -> Result<Self, TaskDomainError> {
        Ok(Self {
            id: TaskId::new(),
            text: validated_text(text)?,
            priority,
            completed: false,
            created_at: clock.timestamp(),
            completed_at: None,
            was_auto_promoted: false,
            sort_rank,
        })
    }

    /// Reconstructs a task from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedTaskData) -> Self {
        Self {
            id: data.id,
            text: data.text,
            priority: data.priority,
            completed: data.completed,
            created_at: data.created_at,
            completed_at: data.completed_at,
            was_auto_promoted: data.was_auto_promoted,
            sort_rank: data.sort_rank,
        }
    }

    /// Returns the task identifier.
    #[must_use]
    pub const fn id(&self) -> &TaskId {
        &self.id
    }

    /// Returns the task label.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Returns the priority.
    #[must_use]
    pub const fn priority(&self) -> Priority {
        self.priority
    }

    /// Returns whether the task is complete.
    #[must_use]
    pub const fn is_completed(&self) -> bool {
        self.completed
    }

    /// Returns the creation timestamp, empty when unknown.
    #[must_use]
    pub fn created_at(&self) -> &str {
        &self.created_at
    }

    /// Returns the completion timestamp.
    #[must_use]
    pub fn completed_at(&self) -> Option<&str> {
        self.completed_at.as_deref()
    }

    /// Returns whether the task was escalated or carried over from an
    /// earlier day.
    #[must_use]
    pub const fn was_auto_promoted(&self) -> bool {
        self.was_auto_promoted
    }

    /// Returns the manual sort rank. Higher ranks sort first.
    #[must_use]
    pub const fn sort_rank(&self) -> i64 {
        self.sort_rank
    }

    /// Returns the `YYYY-MM-DD` prefix of the creation timestamp.
    #[must_use]
    pub fn created_date(&self) -> &str {
        self.created_at
            .get(..DATE_PREFIX_LEN)
            .unwrap_or(&self.created_at)
    }

    /// Returns `true` when the task is incomplete and was created on a day
    /// before `today`. Tasks without a creation date are never stale.
    #[must_use]
    pub fn is_stale_on(&self, today: &str) -> bool {
        let created = self.created_date();
        !self.completed && !created.is_empty() && created < today
    }

    /// Flips the completion flag, stamping or clearing `completed_at`.
    ///
    /// Returns the new completion state.
    pub fn toggle_completed(&mut self, timestamp: String) -> bool {
        self.completed = !self.completed;
        self.completed_at = self.completed.then_some(timestamp);
        self.completed
    }

    /// Replaces the label and priority, clearing the carried-over flag.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::EmptyTaskText`] when `text` is blank; the
    /// task is left unchanged.
    pub fn edit(
        &mut self,
        text: impl Into<String>,
        priority: Priority,
    ) -> Result<(), TaskDomainError> {
        self.text = validated_text(text)?;
        self.priority = priority;
        self.was_auto_promoted = false;
        Ok(())
    }

    /// Escalates the task to [`Priority::High`] at the given rank.
    pub(crate) const fn promote(&mut self, sort_rank: i64) {
        self.priority = Priority::High;
        self.was_auto_promoted = true;
        self.sort_rank = sort_rank;
    }

    /// Flags an already high-priority task as carried over.
    pub(crate) const fn mark_carried_over(&mut self) {
        self.was_auto_promoted = true;
    }

    pub(crate) const fn set_sort_rank(&mut self, sort_rank: i64) {
        self.sort_rank = sort_rank;
    }
}

fn validated_text(text: impl Into<String>) -> Result<String, TaskDomainError> {
    let raw = text.into();
    if raw.trim().is_empty() {
        return Err(TaskDomainError::EmptyTaskText);
    }
    Ok(raw)
}
