//! Conversation session manager.
//!
//! One [`ConversationSession`] drives one conversation:
//!
//! ```text
//! Idle --submit--> Sending --reply--> Idle
//!                          --error--> Idle (apology turn + error banner)
//! ```
//!
//! Submissions are serialized. While a round trip is in flight, a further
//! `submit` is refused with [`SessionError::ReentrancyRejected`] and leaves
//! the transcript untouched, so user and assistant turns always alternate.
//!
//! The user turn is committed before the request goes out and is not rolled
//! back if the request fails: the transcript shows what was asked even when
//! it went unanswered.

use parking_lot::Mutex;

use zendo_proto::chat::ConversationId;

use super::{ConversationTurn, SUGGESTED_PROMPTS, SessionError};
use crate::api::ChatApi;
use crate::context::SessionContext;

/// How an accepted submission ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExchangeOutcome {
    /// The assistant's reply was appended.
    Replied,
    /// The round trip failed; an apology turn was appended and the error
    /// banner is set.
    Failed,
}

#[derive(Debug, Default)]
struct SessionState {
    transcript: Vec<ConversationTurn>,
    input: String,
    conversation_id: Option<ConversationId>,
    busy: bool,
    error: Option<String>,
}

/// Clears the busy flag however the in-flight submission ends, including
/// when its future is dropped mid-request.
struct BusyGuard<'a> {
    state: &'a Mutex<SessionState>,
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.state.lock().busy = false;
    }
}

/// Owns conversation identity, the transcript, and the input buffer.
pub struct ConversationSession<C: ChatApi> {
    api: C,
    context: SessionContext,
    state: Mutex<SessionState>,
}

impl<C: ChatApi> ConversationSession<C> {
    /// Creates an idle session with an empty transcript and no conversation.
    pub fn new(api: C, context: SessionContext) -> Self {
        Self {
            api,
            context,
            state: Mutex::new(SessionState::default()),
        }
    }

    /// Submits `text` as the next user turn and waits for the reply.
    ///
    /// The user turn is appended, the input buffer cleared, and any previous
    /// error banner dismissed before the request is sent. Transport and
    /// decoding failures do not surface as `Err`: they become an apology turn
    /// plus an error banner, reported as [`ExchangeOutcome::Failed`].
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::ReentrancyRejected`] while another submission
    /// is in flight and [`SessionError::EmptyMessage`] when `text` is blank.
    /// Neither changes any state.
    pub async fn submit(&self, text: &str) -> Result<ExchangeOutcome, SessionError> {
        let conversation_id = {
            let mut state = self.state.lock();
            if state.busy {
                tracing::debug!("submission rejected: reply still pending");
                return Err(SessionError::ReentrancyRejected);
            }
            if text.trim().is_empty() {
                return Err(SessionError::EmptyMessage);
            }
            state.transcript.push(ConversationTurn::user(text));
            state.input.clear();
            state.error = None;
            state.busy = true;
            state.conversation_id
        };
        let _busy = BusyGuard { state: &self.state };

        let result = self
            .api
            .send_message(self.context.user_id(), text, conversation_id)
            .await;

        let mut state = self.state.lock();
        match result {
            Ok(reply) => {
                if let Some(id) = reply.conversation_id {
                    if state.conversation_id != Some(id) {
                        tracing::info!(
                            user = %self.context.user_id(),
                            conversation = %id,
                            previous = ?state.conversation_id,
                            "conversation bound"
                        );
                    }
                    state.conversation_id = Some(id);
                }
                state.transcript.push(ConversationTurn::assistant(
                    reply.text(),
                    reply.tool_calls().to_vec(),
                ));
                Ok(ExchangeOutcome::Replied)
            }
            Err(error) => {
                tracing::warn!(user = %self.context.user_id(), %error, "chat round trip failed");
                state.error = Some(error.to_string());
                state.transcript.push(ConversationTurn::apology());
                Ok(ExchangeOutcome::Failed)
            }
        }
    }

    /// Submits the current contents of the input buffer.
    ///
    /// # Errors
    ///
    /// Same as [`submit`](Self::submit).
    pub async fn submit_input(&self) -> Result<ExchangeOutcome, SessionError> {
        let text = self.state.lock().input.clone();
        self.submit(&text).await
    }

    /// Replaces the input buffer.
    pub fn set_input(&self, text: impl Into<String>) {
        self.state.lock().input = text.into();
    }

    /// Fills the input buffer with one of the [`SUGGESTED_PROMPTS`].
    ///
    /// Returns `false` and leaves the buffer alone if `index` is out of range.
    pub fn use_suggestion(&self, index: usize) -> bool {
        let Some(prompt) = SUGGESTED_PROMPTS.get(index) else {
            return false;
        };
        self.set_input(*prompt);
        true
    }

    /// Current input buffer contents.
    #[must_use]
    pub fn input(&self) -> String {
        self.state.lock().input.clone()
    }

    /// A copy of the transcript, oldest turn first.
    #[must_use]
    pub fn transcript(&self) -> Vec<ConversationTurn> {
        self.state.lock().transcript.clone()
    }

    /// The most recent turn, if any.
    #[must_use]
    pub fn last_turn(&self) -> Option<ConversationTurn> {
        self.state.lock().transcript.last().cloned()
    }

    /// The server-issued conversation id, `None` before the first reply.
    #[must_use]
    pub fn conversation_id(&self) -> Option<ConversationId> {
        self.state.lock().conversation_id
    }

    /// Whether a submission is in flight.
    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.state.lock().busy
    }

    /// The error banner text from the last failed round trip, if shown.
    #[must_use]
    pub fn error(&self) -> Option<String> {
        self.state.lock().error.clone()
    }

    /// Hides the error banner.
    pub fn dismiss_error(&self) {
        self.state.lock().error = None;
    }
}
