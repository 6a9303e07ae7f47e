//! Read-only projections for the contributor and manager views.

use std::collections::BTreeSet;

use super::model::{Priority, Task, TaskStatus};
use super::table::TaskTable;

/// Row filter. `None` fields do not constrain.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskFilter {
    /// Exact assignee match.
    pub assigned_to: Option<String>,
    /// Allowed priorities. An empty list matches nothing.
    pub priorities: Option<Vec<Priority>>,
}

impl TaskFilter {
    pub fn assigned_to(mut self, who: impl Into<String>) -> Self {
        self.assigned_to = Some(who.into());
        self
    }

    pub fn priorities(mut self, priorities: impl IntoIterator<Item = Priority>) -> Self {
        self.priorities = Some(priorities.into_iter().collect());
        self
    }

    pub fn matches(&self, task: &Task) -> bool {
        let who_ok = self
            .assigned_to
            .as_deref()
            .is_none_or(|who| task.assigned_to == who);
        let priority_ok = self
            .priorities
            .as_ref()
            .is_none_or(|allowed| allowed.contains(&task.priority));
        who_ok && priority_ok
    }

    pub fn apply<'a>(&self, table: &'a TaskTable) -> Vec<&'a Task> {
        table.iter().filter(|t| self.matches(t)).collect()
    }
}

/// Count tasks per status, in status order. Statuses with no tasks are omitted.
pub fn status_counts<'a>(tasks: impl IntoIterator<Item = &'a Task>) -> Vec<(TaskStatus, usize)> {
    let mut counts = [0usize; TaskStatus::ALL.len()];
    for task in tasks {
        if let Some(slot) = TaskStatus::ALL.iter().position(|s| *s == task.status) {
            counts[slot] += 1;
        }
    }
    TaskStatus::ALL
        .into_iter()
        .zip(counts)
        .filter(|(_, n)| *n > 0)
        .collect()
}

/// Distinct non-blank assignees, sorted, exactly as stored so each entry
/// can be fed back into [`TaskFilter::assigned_to`].
pub fn assignees(table: &TaskTable) -> Vec<String> {
    table
        .iter()
        .map(|t| t.assigned_to.as_str())
        .filter(|who| !who.trim().is_empty())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(str::to_string)
        .collect()
}
