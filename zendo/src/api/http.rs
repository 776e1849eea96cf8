//! HTTP implementation of the task and chat APIs.
//!
//! Endpoints, relative to the configured base URL:
//!
//! | operation            | request                               |
//! |----------------------|---------------------------------------|
//! | list tasks           | `GET   /api/{user}/tasks`             |
//! | change task status   | `PATCH /api/{user}/tasks/{id}`        |
//! | chat                 | `POST  /api/{user}/chat`              |
//!
//! Any non-2xx status is reported as [`ApiError::Status`]; a 2xx body that
//! does not decode is [`ApiError::MalformedResponse`].

use std::time::Duration;

use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, RequestBuilder};
use url::Url;

use zendo_proto::chat::{ChatReply, ChatRequest, ConversationId};
use zendo_proto::codec;
use zendo_proto::identity::UserId;
use zendo_proto::task::{StatusPatch, Task, TaskId, TaskStatus};

use super::{ApiError, ChatApi, TaskApi};

/// Default whole-request timeout.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Default TCP connect timeout.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// JSON-over-HTTP client for the dashboard server.
///
/// Cheap to clone; clones share one connection pool.
#[derive(Debug, Clone)]
pub struct HttpApi {
    client: Client,
    base_url: Url,
}

impl HttpApi {
    /// Creates a client for `base_url` with the given timeouts.
    #[must_use]
    pub fn new(base_url: Url, request_timeout: Duration, connect_timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(request_timeout)
            .connect_timeout(connect_timeout)
            .pool_idle_timeout(Duration::from_secs(90))
            .build()
            .unwrap_or_else(|error| {
                tracing::warn!(%error, "falling back to default HTTP client");
                Client::new()
            });
        Self::with_client(client, base_url)
    }

    /// Creates a client that reuses an existing `reqwest::Client`.
    #[must_use]
    pub fn with_client(client: Client, base_url: Url) -> Self {
        Self { client, base_url }
    }

    /// The base URL requests are resolved against.
    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Builds `{base}/api/{user}/{tail...}`, percent-encoding every segment.
    fn endpoint(&self, user: &UserId, tail: &[&str]) -> Result<Url, ApiError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| {
                ApiError::InvalidRequest(format!("base URL cannot take a path: {}", self.base_url))
            })?
            .pop_if_empty()
            .push("api")
            .push(user.as_str())
            .extend(tail);
        Ok(url)
    }

    /// Sends a request and returns the body of a 2xx response.
    async fn execute(&self, request: RequestBuilder) -> Result<Vec<u8>, ApiError> {
        let response = request
            .send()
            .await
            .map_err(|e| ApiError::Unreachable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            tracing::debug!(status = status.as_u16(), url = %response.url(), "request rejected");
            return Err(ApiError::Status(status.as_u16()));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| ApiError::Unreachable(e.to_string()))?;
        Ok(body.to_vec())
    }
}

impl TaskApi for HttpApi {
    async fn list_tasks(&self, user: &UserId) -> Result<Vec<Task>, ApiError> {
        let url = self.endpoint(user, &["tasks"])?;
        tracing::debug!(%url, "listing tasks");
        let body = self.execute(self.client.get(url)).await?;
        Ok(codec::decode_task_list(&body)?)
    }

    async fn patch_task_status(
        &self,
        user: &UserId,
        task_id: TaskId,
        status: TaskStatus,
    ) -> Result<(), ApiError> {
        let id = task_id.to_string();
        let url = self.endpoint(user, &["tasks", id.as_str()])?;
        let body = codec::encode_status_patch(&StatusPatch { status })?;
        tracing::debug!(%url, %status, "patching task status");
        self.execute(
            self.client
                .patch(url)
                .header(CONTENT_TYPE, "application/json")
                .body(body),
        )
        .await?;
        Ok(())
    }
}

impl ChatApi for HttpApi {
    async fn send_message(
        &self,
        user: &UserId,
        message: &str,
        conversation_id: Option<ConversationId>,
    ) -> Result<ChatReply, ApiError> {
        let url = self.endpoint(user, &["chat"])?;
        let body = codec::encode_chat_request(&ChatRequest {
            message: message.to_string(),
            conversation_id,
        })?;
        tracing::debug!(%url, conversation = ?conversation_id, "sending chat message");
        let reply = self
            .execute(
                self.client
                    .post(url)
                    .header(CONTENT_TYPE, "application/json")
                    .body(body),
            )
            .await?;
        Ok(codec::decode_chat_reply(&reply)?)
    }
}
