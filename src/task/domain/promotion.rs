//! Daily escalation of stale tasks.

use super::{Priority, TaskId, TaskTable};

/// Tasks changed by one promotion pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PromotionSummary {
    /// Tasks raised to [`Priority::High`] and moved to the top.
    pub promoted: Vec<TaskId>,
    /// High-priority tasks flagged as carried over from an earlier day.
    pub carried_over: Vec<TaskId>,
}

impl PromotionSummary {
    /// Returns `true` when the pass changed nothing.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.promoted.is_empty() && self.carried_over.is_empty()
    }
}

/// Escalates incomplete tasks created before `today` (`YYYY-MM-DD`).
///
/// A stale task below [`Priority::High`] becomes high priority, is flagged
/// as auto-promoted and receives a rank above every existing one, so it
/// lands at the top of the active list. A stale task that is already high
/// priority is only flagged. The two rules are disjoint because they
/// disagree on the starting priority.
pub fn promote_stale_tasks(table: &mut TaskTable, today: &str) -> PromotionSummary {
    let mut next_rank = table.max_sort_rank().saturating_add(1);
    let mut summary = PromotionSummary::default();

    for task in table.tasks_mut().filter(|task| task.is_stale_on(today)) {
        if task.priority() != Priority::High {
            task.promote(next_rank);
            next_rank = next_rank.saturating_add(1);
            summary.promoted.push(task.id().clone());
        } else if !task.was_auto_promoted() {
            task.mark_carried_over();
            summary.carried_over.push(task.id().clone());
        }
    }

    summary
}
