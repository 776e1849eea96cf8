//! End-to-end dashboard flows.
//!
//! Wires a conversation session, a polling reconciler, and a mutation
//! coordinator to one shared in-memory backend, the way the binary wires
//! them to the HTTP API, and walks through the user-visible flows.
//!
//! Verification command: `cargo test --test dashboard_flow`

#![allow(clippy::expect_used, clippy::unwrap_used)]

use std::sync::Arc;
use std::time::Duration;

use zendo::api::ApiError;
use zendo::api::memory::InMemoryApi;
use zendo::chat::{ConversationSession, ExchangeOutcome, Role};
use zendo::context::SessionContext;
use zendo::tasks::{
    Direction, MutationCoordinator, MutationError, ReconcilerHandle, TaskReconciler,
};
use zendo_proto::chat::{ChatReply, ConversationId};
use zendo_proto::identity::UserId;
use zendo_proto::task::{Task, TaskId, TaskStatus};

const POLL: Duration = Duration::from_secs(5);

// ---------------------------------------------------------------------------
// Test harness
// ---------------------------------------------------------------------------

struct Dashboard {
    api: InMemoryApi,
    session: ConversationSession<InMemoryApi>,
    reconciler: Arc<TaskReconciler<InMemoryApi>>,
    coordinator: MutationCoordinator<InMemoryApi>,
    poller: ReconcilerHandle,
}

fn user() -> UserId {
    UserId::new("User")
}

/// Builds every component against one backend and starts polling.
async fn start_dashboard(api: InMemoryApi) -> Dashboard {
    let context = SessionContext::new(user());
    let reconciler = Arc::new(TaskReconciler::new(api.clone(), context.clone(), POLL));
    let poller = reconciler.start();
    // Let the immediate first refresh land.
    tokio::time::sleep(Duration::from_millis(1)).await;
    Dashboard {
        session: ConversationSession::new(api.clone(), context),
        coordinator: MutationCoordinator::new(api.clone(), Arc::clone(&reconciler)),
        reconciler,
        poller,
        api,
    }
}

impl Dashboard {
    fn column(&self, status: TaskStatus) -> Vec<i64> {
        self.reconciler.current_snapshot().columns()[&status]
            .iter()
            .map(|t| t.id.get())
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Flows
// ---------------------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn assistant_adds_task_then_board_catches_up() {
    let dash = start_dashboard(InMemoryApi::new()).await;
    assert!(dash.column(TaskStatus::ToDo).is_empty());

    // The server runs the add_task tool while answering.
    dash.api.push_chat_reply(Ok(
        ChatReply::new(ConversationId::new(42), "Added!").with_tool_call("add_task")
    ));
    let outcome = dash.session.submit("Add a task to buy groceries").await.unwrap();
    dash.api.insert_task(
        &user(),
        Task::new(TaskId::new(1), "buy groceries", TaskStatus::ToDo),
    );
    assert_eq!(outcome, ExchangeOutcome::Replied);

    let transcript = dash.session.transcript();
    assert_eq!(transcript.len(), 2);
    assert_eq!(transcript[0].role, Role::User);
    assert_eq!(transcript[0].content, "Add a task to buy groceries");
    assert_eq!(transcript[1].role, Role::Assistant);
    assert_eq!(transcript[1].content, "Added!");
    assert_eq!(transcript[1].tool_calls()[0].name, "add_task");
    assert_eq!(dash.session.conversation_id(), Some(ConversationId::new(42)));
    assert_eq!(dash.api.chats()[0].conversation_id, None);

    // The chat path never touches the board.
    assert!(dash.column(TaskStatus::ToDo).is_empty());

    tokio::time::sleep(POLL).await;
    assert_eq!(dash.column(TaskStatus::ToDo), vec![1]);

    // The follow-up carries the server-issued id.
    dash.session.submit("Show all tasks").await.unwrap();
    assert_eq!(dash.api.chats()[1].conversation_id, Some(ConversationId::new(42)));

    dash.poller.stop().await;
}

#[tokio::test(start_paused = true)]
async fn board_move_shows_after_its_own_refresh() {
    let api = InMemoryApi::new();
    api.insert_task(
        &user(),
        Task::new(TaskId::new(42), "buy groceries", TaskStatus::ToDo),
    );
    let dash = start_dashboard(api).await;
    assert_eq!(dash.column(TaskStatus::ToDo), vec![42]);
    let calls = dash.api.list_calls();

    dash.coordinator
        .request_status_change(TaskId::new(42), Direction::Forward)
        .await
        .unwrap();

    assert_eq!(dash.api.patches().len(), 1);
    assert_eq!(dash.api.patches()[0].status, TaskStatus::InProgress);
    assert_eq!(dash.api.list_calls(), calls + 1);
    assert!(dash.column(TaskStatus::ToDo).is_empty());
    assert_eq!(dash.column(TaskStatus::InProgress), vec![42]);

    dash.poller.stop().await;
}

#[tokio::test(start_paused = true)]
async fn rejected_move_refreshes_exactly_once_and_stays_put() {
    let api = InMemoryApi::new();
    api.insert_task(
        &user(),
        Task::new(TaskId::new(42), "buy groceries", TaskStatus::ToDo),
    );
    let dash = start_dashboard(api).await;
    let calls = dash.api.list_calls();
    dash.api.fail_next_patch(ApiError::Status(500));

    let err = dash
        .coordinator
        .request_status_change(TaskId::new(42), Direction::Forward)
        .await
        .unwrap_err();

    assert_eq!(err, MutationError::Api(ApiError::Status(500)));
    assert_eq!(dash.api.patches().len(), 1);
    assert_eq!(dash.api.list_calls(), calls + 1);
    assert_eq!(dash.column(TaskStatus::ToDo), vec![42]);

    dash.poller.stop().await;
}

#[tokio::test(start_paused = true)]
async fn assistant_completes_task_while_board_is_stale() {
    let api = InMemoryApi::new();
    api.insert_task(&user(), Task::new(TaskId::new(1), "ship", TaskStatus::InProgress));
    let dash = start_dashboard(api).await;

    // "Mark task 1 as complete" handled by a server-side tool.
    dash.api.push_chat_reply(Ok(
        ChatReply::new(ConversationId::new(5), "Done!").with_tool_call("complete_task")
    ));
    dash.session.submit("Mark task 1 as complete").await.unwrap();
    dash.api.insert_task(&user(), Task::new(TaskId::new(1), "ship", TaskStatus::Done));

    // The board still offers a forward move from its stale view; the server
    // accepts the write and the refresh shows the server's answer.
    dash.coordinator
        .request_status_change(TaskId::new(1), Direction::Forward)
        .await
        .unwrap();
    assert_eq!(dash.column(TaskStatus::Done), vec![1]);

    dash.poller.stop().await;
}

#[tokio::test(start_paused = true)]
async fn chat_outage_does_not_disturb_the_board() {
    let api = InMemoryApi::new();
    api.insert_task(&user(), Task::new(TaskId::new(3), "x", TaskStatus::Done));
    let dash = start_dashboard(api).await;
    let before = dash.reconciler.current_snapshot();

    dash.api
        .push_chat_reply(Err(ApiError::Unreachable("connection refused".into())));
    assert_eq!(
        dash.session.submit("hello").await,
        Ok(ExchangeOutcome::Failed)
    );
    assert!(dash.session.error().is_some());
    assert!(Arc::ptr_eq(&before, &dash.reconciler.current_snapshot()));

    dash.poller.stop().await;
}
