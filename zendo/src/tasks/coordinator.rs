//! Status moves on the board.
//!
//! A move is a single PATCH followed by exactly one refresh of the snapshot,
//! whether the PATCH succeeded or not. Nothing is written to the snapshot
//! locally: the card stays where it was until the refresh returns the
//! server's view, and a failed move is corrected (or confirmed) by that same
//! refresh.

use std::sync::Arc;

use tokio::task::JoinHandle;
use zendo_proto::task::{TaskId, TaskStatus};

use super::MutationError;
use super::board::Direction;
use super::reconciler::TaskReconciler;
use crate::api::TaskApi;

/// A status change the server accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusChange {
    /// Task that moved.
    pub task_id: TaskId,
    /// Status before the move, as seen in the snapshot.
    pub from: TaskStatus,
    /// Status sent to the server.
    pub to: TaskStatus,
}

/// Performs user-initiated status moves and resynchronizes the board.
pub struct MutationCoordinator<A: TaskApi> {
    api: A,
    reconciler: Arc<TaskReconciler<A>>,
}

impl<A: TaskApi> MutationCoordinator<A> {
    /// Creates a coordinator that patches through `api` and refreshes
    /// `reconciler` afterwards.
    pub const fn new(api: A, reconciler: Arc<TaskReconciler<A>>) -> Self {
        Self { api, reconciler }
    }

    /// The reconciler refreshed after each move.
    #[must_use]
    pub const fn reconciler(&self) -> &Arc<TaskReconciler<A>> {
        &self.reconciler
    }

    /// Moves `task_id` one column in `direction`.
    ///
    /// The target is computed from the task's status in the current
    /// snapshot. On a valid move the PATCH is sent once, then the snapshot is
    /// refreshed once regardless of the PATCH outcome. A failed refresh is
    /// logged by the reconciler and does not affect the result.
    ///
    /// # Errors
    ///
    /// - [`MutationError::TaskNotFound`] if the task is not in the snapshot.
    /// - [`MutationError::TransitionNotOffered`] if the move is not offered
    ///   from the task's status (including unrecognized statuses).
    /// - [`MutationError::Api`] if the PATCH failed.
    ///
    /// No request is made for the first two.
    pub async fn request_status_change(
        &self,
        task_id: TaskId,
        direction: Direction,
    ) -> Result<StatusChange, MutationError> {
        let (from, to) = self.plan(task_id, direction)?;

        let user = self.reconciler.context().user_id();
        let result = self.api.patch_task_status(user, task_id, to).await;
        match &result {
            Ok(()) => tracing::info!(user = %user, task = %task_id, %from, %to, "task status changed"),
            Err(error) => tracing::warn!(
                user = %user,
                task = %task_id,
                %from,
                %to,
                %error,
                "task status change failed"
            ),
        }

        // Errors are logged by the reconciler; the PATCH outcome decides.
        let _ = self.reconciler.refresh_now().await;

        result?;
        Ok(StatusChange { task_id, from, to })
    }

    fn plan(
        &self,
        task_id: TaskId,
        direction: Direction,
    ) -> Result<(TaskStatus, TaskStatus), MutationError> {
        let snapshot = self.reconciler.current_snapshot();
        let task = snapshot
            .get(task_id)
            .ok_or(MutationError::TaskNotFound(task_id))?;
        task.status()
            .and_then(|from| direction.target(from).map(|to| (from, to)))
            .ok_or_else(|| MutationError::TransitionNotOffered {
                task_id,
                status_label: task.status_label.clone(),
                direction,
            })
    }
}

impl<A: TaskApi + 'static> MutationCoordinator<A> {
    /// Runs [`request_status_change`](Self::request_status_change) on its own
    /// task so the caller can keep handling input while the PATCH and the
    /// refresh are in flight.
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn_status_change(
        self: &Arc<Self>,
        task_id: TaskId,
        direction: Direction,
    ) -> JoinHandle<Result<StatusChange, MutationError>> {
        let coordinator = Arc::clone(self);
        tokio::spawn(async move { coordinator.request_status_change(task_id, direction).await })
    }
}
