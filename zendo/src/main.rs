//! Zendo: terminal task board with an AI assistant.
//!
//! Reads commands and chat messages line by line from stdin. Configuration
//! via CLI flags, environment variables, or config file
//! (`~/.config/zendo/config.toml`).
//!
//! ```bash
//! # Against a local API server
//! cargo run --bin zendo -- --base-url http://localhost:8000 --user-id ann
//!
//! # Offline, with demo tasks
//! cargo run --bin zendo -- --offline
//! ```

use std::io;
use std::path::Path;
use std::sync::Arc;

use chrono::{Local, NaiveDate};
use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_appender::non_blocking::WorkerGuard;

use zendo::api::http::HttpApi;
use zendo::api::memory::InMemoryApi;
use zendo::api::{ChatApi, TaskApi};
use zendo::chat::{ConversationSession, SessionError};
use zendo::config::{CliArgs, ClientConfig};
use zendo::console::{self, Command, HELP};
use zendo::context::SessionContext;
use zendo::tasks::{Direction, MutationCoordinator, ReconcilerHandle, TaskReconciler};
use zendo::view;
use zendo_proto::identity::UserId;
use zendo_proto::task::{Priority, Task, TaskId, TaskStatus};

#[tokio::main]
async fn main() -> io::Result<()> {
    let cli = CliArgs::parse();

    let config = match ClientConfig::load(&cli) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Warning: failed to load config file: {e}");
            ClientConfig::from_cli(&cli)
        }
    };

    let _log_guard = init_logging(&cli.log_level, cli.log_file.as_deref());

    tracing::info!(user = %config.user_id, offline = config.offline, "zendo starting");

    let context = config.session_context();
    let result = if config.offline {
        let api = demo_backend(context.user_id());
        run_console(api, context, &config).await
    } else {
        let url = config
            .api_url()
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;
        let api = HttpApi::new(url, config.request_timeout, config.connect_timeout);
        tracing::info!(url = %api.base_url(), "using task API");
        run_console(api, context, &config).await
    };

    tracing::info!("zendo exiting");
    result
}

/// Initialize file-based logging.
///
/// Logs are written to a file so they never interleave with the console.
/// Returns a [`WorkerGuard`] that must be held until shutdown to ensure all
/// buffered log entries are flushed.
fn init_logging(level: &str, file_path: Option<&Path>) -> Option<WorkerGuard> {
    let default_path = std::env::temp_dir().join("zendo.log");
    let log_path = file_path.unwrap_or(&default_path);

    let log_dir = log_path.parent()?;
    let file_name = log_path.file_name()?.to_str()?;

    let file_appender = tracing_appender::rolling::never(log_dir, file_name);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_env_filter(env_filter)
        .with_ansi(false)
        .init();

    Some(guard)
}

/// In-memory backend seeded with a few tasks for offline use.
fn demo_backend(user: &UserId) -> InMemoryApi {
    let api = InMemoryApi::new();
    let today = Local::now().date_naive();
    api.insert_task(
        user,
        Task::new(TaskId::new(1), "Buy groceries", TaskStatus::ToDo)
            .with_description("Milk, eggs, bread")
            .with_due_date(today),
    );
    api.insert_task(
        user,
        Task::new(TaskId::new(2), "Write weekly report", TaskStatus::InProgress)
            .with_priority(Priority::High)
            .with_due_date(today.pred_opt().unwrap_or(today)),
    );
    api.insert_task(
        user,
        Task::new(TaskId::new(3), "Book dentist", TaskStatus::Done).with_priority(Priority::Low),
    );
    api
}

/// Everything one console session works with.
struct Dashboard<A: TaskApi + ChatApi> {
    reconciler: Arc<TaskReconciler<A>>,
    poller: ReconcilerHandle,
    coordinator: Arc<MutationCoordinator<A>>,
    session: Arc<ConversationSession<A>>,
}

async fn run_console<A>(api: A, context: SessionContext, config: &ClientConfig) -> io::Result<()>
where
    A: TaskApi + ChatApi + Clone + 'static,
{
    let reconciler = Arc::new(TaskReconciler::new(
        api.clone(),
        context.clone(),
        config.poll_interval,
    ));
    let dashboard = Dashboard {
        poller: reconciler.start(),
        coordinator: Arc::new(MutationCoordinator::new(api.clone(), Arc::clone(&reconciler))),
        session: Arc::new(ConversationSession::new(api, context.clone())),
        reconciler,
    };

    println!("zendo: tasks for {}. /help lists commands.", context.user_id());
    println!("try one of:\n{}", view::format_prompts());

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        match console::parse(&line) {
            Ok(Command::Quit) => break,
            Ok(command) => dashboard.handle(command),
            Err(e) => println!("{e}"),
        }
    }

    dashboard.poller.stop().await;
    Ok(())
}

impl<A> Dashboard<A>
where
    A: TaskApi + ChatApi + 'static,
{
    fn handle(&self, command: Command) {
        match command {
            Command::Empty | Command::Quit => {}
            Command::Chat(text) => self.send(text),
            Command::Board => print_board(&self.reconciler),
            Command::Refresh => {
                if !self.poller.request_refresh() {
                    println!("refresh already queued");
                }
            }
            Command::Move {
                task_id,
                direction,
            } => self.move_task(task_id, direction),
            Command::Transcript => {
                for turn in self.session.transcript() {
                    print!("{}", view::format_turn(&turn));
                }
            }
            Command::Prompts => print!("{}", view::format_prompts()),
            Command::UsePrompt(index) => {
                if self.session.use_suggestion(index) {
                    self.send(self.session.input());
                } else {
                    println!("no prompt {}", index + 1);
                }
            }
            Command::Dismiss => self.session.dismiss_error(),
            Command::Help => println!("{HELP}"),
        }
    }

    /// Sends `text` in the background so the console stays responsive.
    fn send(&self, text: String) {
        let session = Arc::clone(&self.session);
        tokio::spawn(async move {
            match session.submit(&text).await {
                Ok(_) => {
                    if let Some(turn) = session.last_turn() {
                        print!("{}", view::format_turn(&turn));
                    }
                    if let Some(error) = session.error() {
                        println!("! {error} (/dismiss to hide)");
                    }
                }
                Err(SessionError::ReentrancyRejected) => {
                    println!("still waiting for the previous reply");
                }
                Err(e) => println!("{e}"),
            }
        });
    }

    /// Moves a card in the background; the board is printed once the
    /// refresh that follows the move has landed.
    fn move_task(&self, task_id: TaskId, direction: Direction) {
        let pending = self.coordinator.spawn_status_change(task_id, direction);
        let reconciler = Arc::clone(&self.reconciler);
        tokio::spawn(async move {
            match pending.await {
                Ok(Ok(change)) => {
                    println!("#{} moved to {}", change.task_id, change.to);
                    print_board(&reconciler);
                }
                // Logged by the coordinator; the refreshed board shows the
                // server's view.
                Ok(Err(e)) if e.is_api() => print_board(&reconciler),
                Ok(Err(e)) => println!("{e}"),
                Err(error) => tracing::warn!(%error, task = %task_id, "board move aborted"),
            }
        });
    }
}

fn print_board<A: TaskApi>(reconciler: &TaskReconciler<A>) {
    if reconciler.is_loading() {
        println!("{}", view::LOADING);
        return;
    }
    print!("{}", view::format_board(&reconciler.current_snapshot(), today()));
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}
