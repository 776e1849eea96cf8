//! Plain-text rendering for the console front end.

use std::fmt::Write as _;

use chrono::NaiveDate;
use zendo_proto::task::Task;

use crate::chat::{ConversationTurn, Role, SUGGESTED_PROMPTS};
use crate::tasks::{TaskListSnapshot, card_actions, column_counts};

/// Shown instead of the board until the first refresh completes.
pub const LOADING: &str = "Loading tasks...";

/// Renders the three board columns of `snapshot`, under a one-line summary
/// of the column sizes.
///
/// `today` decides which due dates are marked overdue.
#[must_use]
pub fn format_board(snapshot: &TaskListSnapshot, today: NaiveDate) -> String {
    let summary: Vec<String> = column_counts(snapshot.tasks())
        .into_iter()
        .map(|(status, count)| format!("{status}: {count}"))
        .collect();
    let mut out = format!("[{}]\n", summary.join(" | "));
    for (status, column) in snapshot.columns() {
        let _ = writeln!(out, "== {status} ==");
        if column.is_empty() {
            out.push_str("  (no tasks)\n");
        }
        for task in column {
            out.push_str(&format_card(task, today));
        }
    }
    out
}

/// Renders one task card, ending in a newline.
#[must_use]
pub fn format_card(task: &Task, today: NaiveDate) -> String {
    let mut out = format!("  #{} {} [{}]", task.id, task.title, task.priority);
    if let Some(due) = task.due_date {
        let _ = write!(out, " due {due}");
        if task.is_overdue(today) {
            out.push_str(" (overdue)");
        }
    }

    let actions = card_actions(task);
    if actions.can_move_back {
        out.push_str("  </back");
    }
    if actions.can_move_forward {
        let _ = write!(out, "  {}>/next", actions.forward_label);
    }
    out.push('\n');

    if let Some(description) = task.description.as_deref().filter(|d| !d.is_empty()) {
        let _ = writeln!(out, "      {description}");
    }
    out
}

/// Renders a transcript turn, with tool calls on a second line.
#[must_use]
pub fn format_turn(turn: &ConversationTurn) -> String {
    let speaker = match turn.role {
        Role::User => "you",
        Role::Assistant => "assistant",
    };
    let mut out = format!("{speaker}> {}\n", turn.content);
    let tools = turn.tool_calls();
    if !tools.is_empty() {
        let names: Vec<&str> = tools.iter().map(|t| t.name.as_str()).collect();
        let _ = writeln!(out, "  [tools: {}]", names.join(", "));
    }
    out
}

/// Numbered list of the suggested prompts, as `/use <n>` expects them.
#[must_use]
pub fn format_prompts() -> String {
    SUGGESTED_PROMPTS
        .iter()
        .enumerate()
        .fold(String::new(), |mut out, (i, prompt)| {
            let _ = writeln!(out, "  {}. {prompt}", i + 1);
            out
        })
}
