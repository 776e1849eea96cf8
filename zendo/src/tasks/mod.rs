//! Board view of the task collection.
//!
//! - [`reconciler`] keeps the local snapshot in step with the server by
//!   polling.
//! - [`coordinator`] performs user-initiated status moves and resyncs
//!   afterwards.
//! - [`board`] projects a snapshot into the three status columns.
//!
//! Mutations are not applied locally. The board changes only when a refresh
//! replaces the snapshot.

pub mod board;
pub mod coordinator;
pub mod reconciler;

pub use board::{CardActions, Direction, card_actions, column_counts, group_by_status};
pub use coordinator::{MutationCoordinator, StatusChange};
pub use reconciler::{ReconcilerHandle, TaskListSnapshot, TaskReconciler};

use zendo_proto::task::TaskId;

use crate::api::ApiError;

/// Errors returned by [`MutationCoordinator::request_status_change`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MutationError {
    /// The task is not in the current snapshot.
    #[error("task {0} is not on the board")]
    TaskNotFound(TaskId),

    /// The move is not offered from the task's current status.
    #[error("task {task_id} cannot move {direction} from {status_label:?}")]
    TransitionNotOffered {
        /// Task the move was requested for.
        task_id: TaskId,
        /// Status label in the snapshot when the move was requested.
        status_label: String,
        /// Requested direction.
        direction: Direction,
    },

    /// The status change request failed.
    #[error(transparent)]
    Api(#[from] ApiError),
}

impl MutationError {
    /// Whether the error came from the network round trip rather than local
    /// validation.
    #[must_use]
    pub const fn is_api(&self) -> bool {
        matches!(self, Self::Api(_))
    }
}
