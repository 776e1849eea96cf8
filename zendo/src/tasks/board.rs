//! Board projection of a task list.
//!
//! Grouping is by exact status label. Tasks whose label is not one of the
//! three known statuses appear in no column; they are kept in the snapshot
//! but never rendered.

use std::collections::BTreeMap;
use std::fmt;

use zendo_proto::task::{Task, TaskStatus};

/// Direction of a one-column move on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// One column to the right (`ToDo -> InProgress -> Done`).
    Forward,
    /// One column to the left.
    Backward,
}

impl Direction {
    /// The status a task in `from` moves to, or `None` if the move is not
    /// offered (backward from `ToDo`, forward from `Done`).
    #[must_use]
    pub const fn target(self, from: TaskStatus) -> Option<TaskStatus> {
        match self {
            Self::Forward => from.next(),
            Self::Backward => from.previous(),
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Forward => write!(f, "forward"),
            Self::Backward => write!(f, "backward"),
        }
    }
}

/// Groups tasks into the three board columns.
///
/// Every status is present in the result, with an empty vec when no task has
/// it. Order within a column follows `tasks`.
#[must_use]
pub fn group_by_status(tasks: &[Task]) -> BTreeMap<TaskStatus, Vec<&Task>> {
    let mut columns: BTreeMap<TaskStatus, Vec<&Task>> =
        TaskStatus::ALL.into_iter().map(|s| (s, Vec::new())).collect();
    for task in tasks {
        if let Some(column) = task.status().and_then(|s| columns.get_mut(&s)) {
            column.push(task);
        }
    }
    columns
}

/// Number of tasks in each column.
#[must_use]
pub fn column_counts(tasks: &[Task]) -> BTreeMap<TaskStatus, usize> {
    group_by_status(tasks)
        .into_iter()
        .map(|(status, column)| (status, column.len()))
        .collect()
}

/// Move actions a task card offers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CardActions {
    /// A backward move is offered.
    pub can_move_back: bool,
    /// A forward move is offered.
    pub can_move_forward: bool,
    /// Label for the forward action.
    pub forward_label: &'static str,
}

/// The move actions offered for `task`. Unrecognized statuses offer none.
#[must_use]
pub fn card_actions(task: &Task) -> CardActions {
    let status = task.status();
    CardActions {
        can_move_back: status.and_then(|s| Direction::Backward.target(s)).is_some(),
        can_move_forward: status.and_then(|s| Direction::Forward.target(s)).is_some(),
        forward_label: if status == Some(TaskStatus::InProgress) {
            "Complete"
        } else {
            "Next"
        },
    }
}
