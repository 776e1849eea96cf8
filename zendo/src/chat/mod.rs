//! Conversational view of the task collection.
//!
//! Contains the [`ConversationSession`], which owns the conversation id and
//! the ordered transcript, turns user input into a committed transcript entry
//! before the round trip, and appends the assistant's reply (or a
//! synthesized apology) after it.
//!
//! The chat path never touches the task list. Tasks the assistant creates or
//! edits reach the board only through the reconciler's next poll.

pub mod session;

pub use session::{ConversationSession, ExchangeOutcome};

use zendo_proto::chat::ToolCallSummary;

/// Assistant turn appended when a chat round trip fails.
pub const APOLOGY: &str =
    "\u{26a0}\u{fe0f} Sorry, I encountered an error connecting to the service. Please try again.";

/// Starter prompts offered on an empty conversation.
pub const SUGGESTED_PROMPTS: [&str; 4] = [
    "Add a task to buy groceries",
    "What's on my pending list?",
    "Show all tasks",
    "Mark task 1 as complete",
];

/// Errors returned when a submission is refused before any I/O.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    /// The message is empty or whitespace only.
    #[error("message is empty")]
    EmptyMessage,

    /// A previous submission is still waiting for its reply.
    #[error("a message is already being sent")]
    ReentrancyRejected,
}

/// Who authored a transcript turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// The person using the dashboard.
    User,
    /// The server-side assistant.
    Assistant,
}

/// One entry of the transcript. Never modified once appended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversationTurn {
    /// Author of the turn.
    pub role: Role,
    /// Markdown content.
    pub content: String,
    /// Tools the assistant ran for this turn. `None` for user turns and for
    /// synthesized failure turns.
    pub tool_calls: Option<Vec<ToolCallSummary>>,
}

impl ConversationTurn {
    /// A user turn.
    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
            tool_calls: None,
        }
    }

    /// An assistant turn carrying tool-call summaries.
    #[must_use]
    pub fn assistant(content: impl Into<String>, tool_calls: Vec<ToolCallSummary>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
            tool_calls: Some(tool_calls),
        }
    }

    /// The assistant turn appended after a failed round trip.
    #[must_use]
    pub fn apology() -> Self {
        Self {
            role: Role::Assistant,
            content: APOLOGY.to_string(),
            tool_calls: None,
        }
    }

    /// Tool-call summaries, empty when there are none.
    #[must_use]
    pub fn tool_calls(&self) -> &[ToolCallSummary] {
        self.tool_calls.as_deref().unwrap_or_default()
    }
}
