//! Remote API abstraction for `Zendo`.
//!
//! Defines the [`TaskApi`] and [`ChatApi`] traits the synchronization core
//! talks to. Concrete implementations:
//! - [`http::HttpApi`]: JSON over HTTP against the dashboard server
//! - [`memory::InMemoryApi`]: in-process store for tests and offline mode
//!
//! Both traits are request/response only. The server offers no change feed,
//! so nothing here ever pushes data to the client.

pub mod http;
pub mod memory;

use zendo_proto::chat::{ChatReply, ConversationId};
use zendo_proto::codec::CodecError;
use zendo_proto::identity::UserId;
use zendo_proto::task::{Task, TaskId, TaskStatus};

/// Errors returned by remote API calls.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    /// The server could not be reached or the request timed out.
    #[error("service unreachable: {0}")]
    Unreachable(String),

    /// The server answered with a non-success HTTP status.
    #[error("server error: {0}")]
    Status(u16),

    /// The response body was not the expected JSON shape.
    #[error("malformed response: {0}")]
    MalformedResponse(String),

    /// The request could not be built (bad endpoint or unencodable body).
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl ApiError {
    /// Whether this is a transport-class failure (unreachable or non-2xx).
    #[must_use]
    pub const fn is_transport(&self) -> bool {
        matches!(self, Self::Unreachable(_) | Self::Status(_))
    }
}

impl From<CodecError> for ApiError {
    fn from(err: CodecError) -> Self {
        match err {
            CodecError::Malformed(msg) => Self::MalformedResponse(msg),
            CodecError::Serialization(msg) => Self::InvalidRequest(msg),
        }
    }
}

/// Remote task store.
///
/// The client never creates or deletes tasks. It reads full lists and
/// requests status transitions.
pub trait TaskApi: Send + Sync {
    /// Fetch every task belonging to `user`.
    fn list_tasks(
        &self,
        user: &UserId,
    ) -> impl std::future::Future<Output = Result<Vec<Task>, ApiError>> + Send;

    /// Ask the server to move a task to `status`.
    ///
    /// Returns once the server acknowledges the change. The response body,
    /// if any, is ignored: the caller reconciles from a fresh task list.
    fn patch_task_status(
        &self,
        user: &UserId,
        task_id: TaskId,
        status: TaskStatus,
    ) -> impl std::future::Future<Output = Result<(), ApiError>> + Send;
}

/// Remote chat assistant.
///
/// One call is one full round trip. Tools the assistant runs (which may
/// create or edit tasks) have completed server-side by the time the reply
/// arrives.
pub trait ChatApi: Send + Sync {
    /// Send a message, continuing `conversation_id` when given.
    fn send_message(
        &self,
        user: &UserId,
        message: &str,
        conversation_id: Option<ConversationId>,
    ) -> impl std::future::Future<Output = Result<ChatReply, ApiError>> + Send;
}
