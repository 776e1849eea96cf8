//! Property-based tests for board grouping and card actions.
//!
//! Uses proptest to verify:
//! 1. Grouping partitions the recognized tasks: every such task lands in
//!    exactly one column, the column matching its status.
//! 2. Tasks with unrecognized status labels land in no column.
//! 3. Column order follows input order.
//! 4. A card offers a move exactly when the transition table has a target.

use std::collections::BTreeSet;

use proptest::prelude::*;
use zendo::tasks::{Direction, card_actions, group_by_status};
use zendo_proto::task::{Task, TaskId, TaskStatus};

/// Strategy for a status label: mostly the three known ones, sometimes junk.
fn arb_status_label() -> impl Strategy<Value = String> {
    prop_oneof![
        4 => prop::sample::select(TaskStatus::ALL.to_vec()).prop_map(|s| s.label().to_string()),
        1 => "[a-z ]{0,12}",
    ]
}

/// Strategy for a task list with unique ids.
fn arb_tasks() -> impl Strategy<Value = Vec<Task>> {
    prop::collection::vec(arb_status_label(), 0..40).prop_map(|labels| {
        labels
            .into_iter()
            .enumerate()
            .map(|(i, label)| {
                let id = i64::try_from(i).unwrap_or(i64::MAX);
                Task::new(TaskId::new(id), format!("t{i}"), TaskStatus::ToDo)
                    .with_status_label(label)
            })
            .collect()
    })
}

proptest! {
    #[test]
    fn grouping_partitions_recognized_tasks(tasks in arb_tasks()) {
        let columns = group_by_status(&tasks);
        prop_assert_eq!(columns.len(), 3);

        let mut seen = BTreeSet::new();
        for (status, column) in &columns {
            for task in column {
                prop_assert_eq!(task.status(), Some(*status));
                prop_assert!(seen.insert(task.id), "task {} in two columns", task.id);
            }
        }

        let expected: BTreeSet<TaskId> = tasks
            .iter()
            .filter(|t| t.status().is_some())
            .map(|t| t.id)
            .collect();
        prop_assert_eq!(seen, expected);
    }

    #[test]
    fn columns_keep_input_order(tasks in arb_tasks()) {
        for column in group_by_status(&tasks).values() {
            let ids: Vec<TaskId> = column.iter().map(|t| t.id).collect();
            let mut sorted = ids.clone();
            sorted.sort();
            // Ids are assigned in input order.
            prop_assert_eq!(ids, sorted);
        }
    }

    #[test]
    fn card_actions_follow_transition_table(tasks in arb_tasks()) {
        for task in &tasks {
            let actions = card_actions(task);
            let status = task.status();
            prop_assert_eq!(
                actions.can_move_forward,
                status.and_then(|s| Direction::Forward.target(s)).is_some()
            );
            prop_assert_eq!(
                actions.can_move_back,
                status.and_then(|s| Direction::Backward.target(s)).is_some()
            );
        }
    }
}
