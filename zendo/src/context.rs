//! Session context shared by every component.

use zendo_proto::identity::UserId;

/// Identity of the session a component works on behalf of.
///
/// Built once at startup and handed to each component's constructor, so
/// tests can run several independent sessions side by side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionContext {
    user_id: UserId,
}

impl SessionContext {
    /// Creates a context for `user_id`.
    #[must_use]
    pub const fn new(user_id: UserId) -> Self {
        Self { user_id }
    }

    /// The user every request is made for.
    #[must_use]
    pub const fn user_id(&self) -> &UserId {
        &self.user_id
    }
}
