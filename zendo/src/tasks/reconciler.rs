//! Task collection reconciler.
//!
//! Keeps a local [`TaskListSnapshot`] in step with the server by polling.
//! The server has no change feed, so polling is the only way mutations made
//! by other actors (the assistant's tools, other clients) reach the board.
//!
//! # Refresh policy
//!
//! - Every refresh fetches the full list and replaces the snapshot whole.
//! - A failed refresh keeps the previous snapshot (the same `Arc`) and is
//!   only logged; stale data is preferred over an empty board.
//! - Two refreshes may overlap (poll tick and post-mutation refresh). The
//!   one that completes last wins. There is no fencing.
//!
//! # Poll loop
//!
//! [`TaskReconciler::start`] spawns a loop that refreshes immediately, then on
//! every tick of a fixed interval, and whenever
//! [`ReconcilerHandle::request_refresh`] is called. The loop ends when
//! [`ReconcilerHandle::stop`] is awaited or the handle is dropped.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use parking_lot::RwLock;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};

use zendo_proto::task::{Task, TaskId, TaskStatus};

use super::board::group_by_status;
use crate::api::{ApiError, TaskApi};
use crate::context::SessionContext;

/// Default interval between scheduled refreshes.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Capacity of the manual refresh trigger channel. Extra requests while
/// the channel is full are dropped; a refresh is already queued.
const TRIGGER_CAPACITY: usize = 1;

/// An immutable copy of the user's task list taken by one refresh.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskListSnapshot {
    tasks: Vec<Task>,
    revision: u64,
}

impl TaskListSnapshot {
    /// All tasks in server order, including ones with unrecognized status.
    #[must_use]
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    /// Number of successful refreshes that led to this snapshot. Zero for
    /// the initial empty snapshot. Informational only.
    #[must_use]
    pub const fn revision(&self) -> u64 {
        self.revision
    }

    /// Looks up a task by id.
    #[must_use]
    pub fn get(&self, task_id: TaskId) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == task_id)
    }

    /// Number of tasks, including ones no column shows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// Whether the snapshot holds no tasks.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Tasks grouped into board columns.
    #[must_use]
    pub fn columns(&self) -> std::collections::BTreeMap<TaskStatus, Vec<&Task>> {
        group_by_status(&self.tasks)
    }
}

/// Owns the task snapshot and the poll loop that refreshes it.
///
/// Only the reconciler writes the snapshot. Everyone else reads it through
/// [`current_snapshot`](Self::current_snapshot).
pub struct TaskReconciler<A: TaskApi> {
    api: A,
    context: SessionContext,
    poll_interval: Duration,
    snapshot: RwLock<Arc<TaskListSnapshot>>,
    loading: AtomicBool,
}

impl<A: TaskApi> TaskReconciler<A> {
    /// Creates a reconciler with an empty snapshot. Nothing is fetched until
    /// [`refresh_now`](Self::refresh_now) or [`start`](Self::start).
    pub fn new(api: A, context: SessionContext, poll_interval: Duration) -> Self {
        Self {
            api,
            context,
            poll_interval,
            snapshot: RwLock::new(Arc::new(TaskListSnapshot::default())),
            loading: AtomicBool::new(true),
        }
    }

    /// The session this reconciler fetches tasks for.
    #[must_use]
    pub const fn context(&self) -> &SessionContext {
        &self.context
    }

    /// Interval between scheduled refreshes.
    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    /// The latest successfully fetched snapshot.
    #[must_use]
    pub fn current_snapshot(&self) -> Arc<TaskListSnapshot> {
        Arc::clone(&*self.snapshot.read())
    }

    /// True until the first refresh attempt completes, successful or not.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.loading.load(Ordering::Acquire)
    }

    /// Fetches the full task list and replaces the snapshot with it.
    ///
    /// # Errors
    ///
    /// Returns the [`ApiError`] of a failed fetch. The previous snapshot is
    /// left in place and the failure is logged; callers are free to ignore
    /// the error.
    pub async fn refresh_now(&self) -> Result<Arc<TaskListSnapshot>, ApiError> {
        let result = self.api.list_tasks(self.context.user_id()).await;
        self.loading.store(false, Ordering::Release);

        match result {
            Ok(tasks) => {
                let mut current = self.snapshot.write();
                let next = Arc::new(TaskListSnapshot {
                    tasks,
                    revision: current.revision + 1,
                });
                *current = Arc::clone(&next);
                drop(current);
                tracing::debug!(
                    user = %self.context.user_id(),
                    tasks = next.len(),
                    revision = next.revision,
                    "task snapshot refreshed"
                );
                Ok(next)
            }
            Err(error) => {
                tracing::warn!(
                    user = %self.context.user_id(),
                    %error,
                    "task refresh failed; keeping previous snapshot"
                );
                Err(error)
            }
        }
    }
}

impl<A: TaskApi + 'static> TaskReconciler<A> {
    /// Spawns the poll loop on the current tokio runtime.
    ///
    /// The first refresh happens immediately. Must be called from within a
    /// tokio runtime.
    #[must_use = "dropping the handle stops the poll loop"]
    pub fn start(self: &Arc<Self>) -> ReconcilerHandle {
        let (trigger_tx, trigger_rx) = mpsc::channel(TRIGGER_CAPACITY);
        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let task = tokio::spawn(poll_loop(Arc::clone(self), trigger_rx, shutdown_rx));
        tracing::info!(
            user = %self.context.user_id(),
            interval_ms = u64::try_from(self.poll_interval.as_millis()).unwrap_or(u64::MAX),
            "task poll loop started"
        );
        ReconcilerHandle {
            trigger: trigger_tx,
            shutdown: shutdown_tx,
            task,
        }
    }
}

async fn poll_loop<A: TaskApi + 'static>(
    reconciler: Arc<TaskReconciler<A>>,
    mut trigger_rx: mpsc::Receiver<()>,
    mut shutdown_rx: oneshot::Receiver<()>,
) {
    let mut ticker = time::interval(reconciler.poll_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;
            _ = &mut shutdown_rx => break,
            _ = ticker.tick() => {}
            Some(()) = trigger_rx.recv() => {}
        }

        tokio::select! {
            biased;
            _ = &mut shutdown_rx => break,
            // Failures are logged inside refresh_now.
            _ = reconciler.refresh_now() => {}
        }
    }

    tracing::info!(user = %reconciler.context.user_id(), "task poll loop stopped");
}

/// Controls a running poll loop.
///
/// Dropping the handle also stops the loop, at its next suspension point.
#[derive(Debug)]
pub struct ReconcilerHandle {
    trigger: mpsc::Sender<()>,
    shutdown: oneshot::Sender<()>,
    task: JoinHandle<()>,
}

impl ReconcilerHandle {
    /// Asks the loop to refresh out of schedule.
    ///
    /// Returns `false` if a manual refresh is already queued or the loop has
    /// stopped.
    pub fn request_refresh(&self) -> bool {
        self.trigger.try_send(()).is_ok()
    }

    /// Whether the loop is still running.
    #[must_use]
    pub fn is_running(&self) -> bool {
        !self.task.is_finished()
    }

    /// Stops the loop and waits for it to exit. An in-flight refresh is
    /// abandoned.
    pub async fn stop(self) {
        // The loop may already have exited; nothing to signal then.
        let _ = self.shutdown.send(());
        if let Err(error) = self.task.await {
            tracing::warn!(%error, "task poll loop ended abnormally");
        }
    }
}
