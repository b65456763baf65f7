//! Caller identity passed explicitly into every operation.

use crate::{
    domain::issue::UserId,
    error::{Result, TaskboardError},
};

/// Who is acting on this request, if anyone is signed in
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthContext {
    user: Option<UserId>,
}

impl AuthContext {
    pub fn new(user: UserId) -> Self {
        Self { user: Some(user) }
    }

    /// A request with no signed-in user
    pub fn anonymous() -> Self {
        Self { user: None }
    }

    pub fn user(&self) -> Option<&UserId> {
        self.user.as_ref()
    }

    /// The acting user, or `Unauthorized` for anonymous requests
    pub fn require_user(&self) -> Result<&UserId> {
        self.user.as_ref().ok_or_else(|| {
            tracing::warn!("rejected request without an acting user");
            TaskboardError::Unauthorized
        })
    }
}

impl From<UserId> for AuthContext {
    fn from(user: UserId) -> Self {
        Self::new(user)
    }
}
