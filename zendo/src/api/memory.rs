//! In-memory task and chat API.
//!
//! Stands in for the dashboard server in tests and in offline mode. Every
//! clone shares one store, so a test can keep a clone to seed tasks, inject
//! failures, and inspect recorded requests while the components under test
//! own their own clones.
//!
//! Tasks added with [`InMemoryApi::insert_task`] model mutations performed by
//! another actor (typically the assistant's tools): the client only sees
//! them after its next list call.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use parking_lot::Mutex;

use zendo_proto::chat::{ChatReply, ConversationId};
use zendo_proto::identity::UserId;
use zendo_proto::task::{Task, TaskId, TaskStatus};

use super::{ApiError, ChatApi, TaskApi};

/// A status change the client asked for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedPatch {
    /// User the request was made for.
    pub user: UserId,
    /// Task the request targeted.
    pub task_id: TaskId,
    /// Requested status.
    pub status: TaskStatus,
}

/// A chat message the client sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedChat {
    /// User the request was made for.
    pub user: UserId,
    /// Message text as sent.
    pub message: String,
    /// Conversation id carried by the request.
    pub conversation_id: Option<ConversationId>,
}

#[derive(Debug, Default)]
struct MemoryState {
    tasks: HashMap<UserId, Vec<Task>>,
    list_failures: VecDeque<ApiError>,
    patch_failures: VecDeque<ApiError>,
    chat_replies: VecDeque<Result<ChatReply, ApiError>>,
    last_conversation_id: i64,
    list_calls: usize,
    patches: Vec<RecordedPatch>,
    chats: Vec<RecordedChat>,
}

impl MemoryState {
    /// Mirrors the server: a missing or unknown conversation gets a new id.
    fn conversation_for(&mut self, requested: Option<ConversationId>) -> ConversationId {
        match requested {
            Some(id) if id.get() > 0 && id.get() <= self.last_conversation_id => id,
            _ => {
                self.last_conversation_id += 1;
                ConversationId::new(self.last_conversation_id)
            }
        }
    }
}

/// Shared in-process implementation of [`TaskApi`] and [`ChatApi`].
#[derive(Debug, Clone, Default)]
pub struct InMemoryApi {
    state: Arc<Mutex<MemoryState>>,
}

impl InMemoryApi {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a task for `user`, as another actor would.
    pub fn insert_task(&self, user: &UserId, task: Task) {
        let mut state = self.state.lock();
        let tasks = state.tasks.entry(user.clone()).or_default();
        if let Some(existing) = tasks.iter_mut().find(|t| t.id == task.id) {
            *existing = task;
        } else {
            tasks.push(task);
        }
    }

    /// Removes a task for `user`. Returns whether it existed.
    pub fn remove_task(&self, user: &UserId, task_id: TaskId) -> bool {
        let mut state = self.state.lock();
        let Some(tasks) = state.tasks.get_mut(user) else {
            return false;
        };
        let before = tasks.len();
        tasks.retain(|t| t.id != task_id);
        tasks.len() != before
    }

    /// Current server-side tasks for `user`.
    #[must_use]
    pub fn tasks(&self, user: &UserId) -> Vec<Task> {
        self.state
            .lock()
            .tasks
            .get(user)
            .cloned()
            .unwrap_or_default()
    }

    /// Makes the next list call fail with `error`.
    pub fn fail_next_list(&self, error: ApiError) {
        self.state.lock().list_failures.push_back(error);
    }

    /// Makes the next patch call fail with `error` (without applying it).
    pub fn fail_next_patch(&self, error: ApiError) {
        self.state.lock().patch_failures.push_back(error);
    }

    /// Queues the result of the next chat call.
    ///
    /// With nothing queued, the store answers with an empty reply filed
    /// under a (possibly new) conversation.
    pub fn push_chat_reply(&self, reply: Result<ChatReply, ApiError>) {
        self.state.lock().chat_replies.push_back(reply);
    }

    /// Number of list calls received, including failed ones.
    #[must_use]
    pub fn list_calls(&self) -> usize {
        self.state.lock().list_calls
    }

    /// Every patch request received, in order.
    #[must_use]
    pub fn patches(&self) -> Vec<RecordedPatch> {
        self.state.lock().patches.clone()
    }

    /// Every chat request received, in order.
    #[must_use]
    pub fn chats(&self) -> Vec<RecordedChat> {
        self.state.lock().chats.clone()
    }
}

impl TaskApi for InMemoryApi {
    async fn list_tasks(&self, user: &UserId) -> Result<Vec<Task>, ApiError> {
        let mut state = self.state.lock();
        state.list_calls += 1;
        if let Some(error) = state.list_failures.pop_front() {
            return Err(error);
        }
        Ok(state.tasks.get(user).cloned().unwrap_or_default())
    }

    async fn patch_task_status(
        &self,
        user: &UserId,
        task_id: TaskId,
        status: TaskStatus,
    ) -> Result<(), ApiError> {
        let mut state = self.state.lock();
        state.patches.push(RecordedPatch {
            user: user.clone(),
            task_id,
            status,
        });
        if let Some(error) = state.patch_failures.pop_front() {
            return Err(error);
        }
        let task = state
            .tasks
            .get_mut(user)
            .and_then(|tasks| tasks.iter_mut().find(|t| t.id == task_id))
            .ok_or(ApiError::Status(404))?;
        task.status_label = status.label().to_string();
        Ok(())
    }
}

impl ChatApi for InMemoryApi {
    async fn send_message(
        &self,
        user: &UserId,
        message: &str,
        conversation_id: Option<ConversationId>,
    ) -> Result<ChatReply, ApiError> {
        let mut state = self.state.lock();
        state.chats.push(RecordedChat {
            user: user.clone(),
            message: message.to_string(),
            conversation_id,
        });
        if let Some(reply) = state.chat_replies.pop_front() {
            return reply;
        }
        let id = state.conversation_for(conversation_id);
        Ok(ChatReply {
            conversation_id: Some(id),
            response: None,
            tool_calls: None,
        })
    }
}
