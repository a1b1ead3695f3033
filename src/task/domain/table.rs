//! The in-memory task table and its ordering rules.

use super::{Cell, MoveDirection, RawTable, ReorderError, Task, TaskId, schema};
use std::{cmp::Reverse, collections::HashSet};

/// Ordered collection of every task in a worksheet.
///
/// Row order is preserved from the worksheet and new tasks are appended.
/// Display order for incomplete tasks comes from the sort rank, with row
/// order breaking ties.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TaskTable {
    tasks: Vec<Task>,
}

impl TaskTable {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a table from tasks in row order.
    #[must_use]
    pub fn from_tasks(tasks: impl IntoIterator<Item = Task>) -> Self {
        Self {
            tasks: tasks.into_iter().collect(),
        }
    }

    /// Returns all tasks in row order.
    #[must_use]
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    /// Returns the number of tasks.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.tasks.len()
    }

    /// Returns `true` when the table holds no tasks.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Finds a task by identifier.
    #[must_use]
    pub fn get(&self, id: &TaskId) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id() == id)
    }

    /// Returns `true` when a task with the identifier exists.
    #[must_use]
    pub fn contains(&self, id: &TaskId) -> bool {
        self.get(id).is_some()
    }

    pub(crate) fn get_mut(&mut self, id: &TaskId) -> Option<&mut Task> {
        self.tasks.iter_mut().find(|task| task.id() == id)
    }

    pub(crate) fn tasks_mut(&mut self) -> impl Iterator<Item = &mut Task> {
        self.tasks.iter_mut()
    }

    /// Appends a task as the last row.
    pub fn push(&mut self, task: Task) {
        self.tasks.push(task);
    }

    /// Removes a task, returning it when it existed.
    pub fn remove(&mut self, id: &TaskId) -> Option<Task> {
        let position = self.tasks.iter().position(|task| task.id() == id)?;
        Some(self.tasks.remove(position))
    }

    /// Returns the highest sort rank in the table, or zero when empty.
    #[must_use]
    pub fn max_sort_rank(&self) -> i64 {
        self.tasks.iter().map(Task::sort_rank).max().unwrap_or(0)
    }

    /// Returns incomplete tasks, highest rank first.
    #[must_use]
    pub fn active(&self) -> Vec<&Task> {
        self.active_positions()
            .into_iter()
            .filter_map(|position| self.tasks.get(position))
            .collect()
    }

    /// Returns completed tasks, most recently completed first.
    ///
    /// Tasks without a completion timestamp fall back to their creation
    /// timestamp.
    #[must_use]
    pub fn history(&self) -> Vec<&Task> {
        let mut completed: Vec<&Task> = self
            .tasks
            .iter()
            .filter(|task| task.is_completed())
            .collect();
        completed.sort_by(|left, right| history_key(right).cmp(history_key(left)));
        completed
    }

    /// Moves an incomplete task one step up or down the active list by
    /// swapping ranks with its neighbour.
    ///
    /// When both ranks are equal the upper task is bumped first so the swap
    /// is visible. Returns `None` when the task does not exist and
    /// `Some(false)` when there is no neighbour in that direction or the
    /// task is complete.
    pub fn move_task(&mut self, id: &TaskId, direction: MoveDirection) -> Option<bool> {
        if !self.contains(id) {
            return None;
        }
        let order = self.active_positions();
        let Some(index) = order.iter().position(|position| {
            self.tasks
                .get(*position)
                .is_some_and(|task| task.id() == id)
        }) else {
            return Some(false);
        };
        let neighbour_index = match direction {
            MoveDirection::Up => index.checked_sub(1),
            MoveDirection::Down => index.checked_add(1),
        };
        let neighbour = neighbour_index.and_then(|slot| order.get(slot).copied());
        let (Some(current), Some(other)) = (order.get(index).copied(), neighbour) else {
            return Some(false);
        };
        let (upper, lower) = match direction {
            MoveDirection::Up => (other, current),
            MoveDirection::Down => (current, other),
        };
        Some(self.swap_ranks(upper, lower))
    }

    /// Assigns ranks from an ordering of task identifiers: the first
    /// identifier receives the highest rank.
    ///
    /// Ranks run from the length of `ids` down to 1. The ordering is meant
    /// to list every incomplete task; tasks left out keep their ranks and
    /// may tie with listed ones. Completed tasks may be listed and are
    /// ranked like any other.
    ///
    /// Returns the number of tasks ranked.
    ///
    /// # Errors
    ///
    /// Returns [`ReorderError::UnknownTask`] for the first identifier that
    /// does not exist and [`ReorderError::DuplicateTask`] for the first one
    /// listed twice. No ranks change in either case.
    pub fn reorder(&mut self, ids: &[TaskId]) -> Result<usize, ReorderError> {
        if let Some(missing) = ids.iter().find(|id| !self.contains(id)) {
            return Err(ReorderError::UnknownTask(missing.clone()));
        }
        let mut seen = HashSet::with_capacity(ids.len());
        if let Some(repeated) = ids.iter().find(|id| !seen.insert(*id)) {
            return Err(ReorderError::DuplicateTask(repeated.clone()));
        }
        let count = ids.len();
        for (position, id) in ids.iter().enumerate() {
            let rank = i64::try_from(count.saturating_sub(position)).unwrap_or(i64::MAX);
            if let Some(task) = self.get_mut(id) {
                task.set_sort_rank(rank);
            }
        }
        Ok(count)
    }

    /// Renders the table as worksheet rows in canonical column order.
    #[must_use]
    pub fn to_raw(&self) -> RawTable {
        self.tasks.iter().fold(RawTable::new(schema::COLUMNS), |raw, task| {
            raw.with_row(vec![
                Cell::text(task.id().as_str()),
                Cell::text(task.text()),
                Cell::text(task.priority().as_str()),
                Cell::Bool(task.is_completed()),
                Cell::text(task.created_at()),
                task.completed_at().map_or(Cell::Empty, Cell::text),
                Cell::Bool(task.was_auto_promoted()),
                Cell::Int(task.sort_rank()),
            ])
        })
    }

    fn active_positions(&self) -> Vec<usize> {
        let mut positions: Vec<usize> = self
            .tasks
            .iter()
            .enumerate()
            .filter(|(_, task)| !task.is_completed())
            .map(|(position, _)| position)
            .collect();
        positions.sort_by_key(|position| {
            Reverse(self.tasks.get(*position).map_or(i64::MIN, Task::sort_rank))
        });
        positions
    }

    fn swap_ranks(&mut self, upper: usize, lower: usize) -> bool {
        let (Some(upper_rank), Some(lower_rank)) = (
            self.tasks.get(upper).map(Task::sort_rank),
            self.tasks.get(lower).map(Task::sort_rank),
        ) else {
            return false;
        };
        let bumped_upper = if upper_rank == lower_rank {
            upper_rank.saturating_add(1)
        } else {
            upper_rank
        };
        if let Some(task) = self.tasks.get_mut(upper) {
            task.set_sort_rank(lower_rank);
        }
        if let Some(task) = self.tasks.get_mut(lower) {
            task.set_sort_rank(bumped_upper);
        }
        true
    }
}

fn history_key(task: &Task) -> &str {
    task.completed_at().unwrap_or_else(|| task.created_at())
}
