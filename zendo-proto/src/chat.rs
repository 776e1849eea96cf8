//! Chat wire types for `POST /api/{user}/chat`.
//!
//! The assistant runs server-side. A chat round trip may execute tools that
//! create or edit tasks; the reply only reports which tools ran, never the
//! resulting task state.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Reply text used when the server answers without any text.
pub const NO_RESPONSE_FALLBACK: &str = "I received your message but have no response.";

/// Server-issued conversation handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConversationId(i64);

impl ConversationId {
    /// Wraps a raw server identifier.
    #[must_use]
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    /// Returns the raw identifier.
    #[must_use]
    pub const fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for ConversationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Request body for a chat message.
///
/// `conversation_id` is always serialized, as `null` on the first turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatRequest {
    /// The user's message text.
    pub message: String,
    /// Conversation to continue, or `None` to start one.
    pub conversation_id: Option<ConversationId>,
}

/// Display-only summary of a tool the assistant ran.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolCallSummary {
    /// Tool name, e.g. `add_task`.
    #[serde(rename = "tool")]
    pub name: String,
}

impl ToolCallSummary {
    /// Creates a summary for the named tool.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// Response body of a chat round trip.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatReply {
    /// Conversation the server filed this exchange under.
    #[serde(default)]
    pub conversation_id: Option<ConversationId>,
    /// Assistant reply text (markdown).
    #[serde(default)]
    pub response: Option<String>,
    /// Tools executed while producing the reply.
    #[serde(default)]
    pub tool_calls: Option<Vec<ToolCallSummary>>,
}

impl ChatReply {
    /// Creates a reply with text and a conversation id.
    #[must_use]
    pub fn new(conversation_id: ConversationId, response: impl Into<String>) -> Self {
        Self {
            conversation_id: Some(conversation_id),
            response: Some(response.into()),
            tool_calls: Some(Vec::new()),
        }
    }

    /// Appends a tool call summary.
    #[must_use]
    pub fn with_tool_call(mut self, name: impl Into<String>) -> Self {
        self.tool_calls
            .get_or_insert_with(Vec::new)
            .push(ToolCallSummary::new(name));
        self
    }

    /// The reply text, or [`NO_RESPONSE_FALLBACK`] when the server sent none.
    #[must_use]
    pub fn text(&self) -> &str {
        match self.response.as_deref() {
            Some(text) if !text.is_empty() => text,
            _ => NO_RESPONSE_FALLBACK,
        }
    }

    /// Tool call summaries, empty when the server sent none.
    #[must_use]
    pub fn tool_calls(&self) -> &[ToolCallSummary] {
        self.tool_calls.as_deref().unwrap_or_default()
    }
}
