//! Authorization context for authenticated users

use crate::error::AuthError;
use crate::roles::{Role, RoleSet};
use crate::types::AuthIdentity;

/// Represents an authenticated user context
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub user: AuthIdentity,
    pub roles: RoleSet,
}

impl AuthContext {
    /// Create new auth context for a user
    pub fn new(user: AuthIdentity, roles: RoleSet) -> Self {
        Self { user, roles }
    }

    pub fn user_id(&self) -> uuid::Uuid {
        self.user.id
    }

    /// Check if user holds a role
    pub fn has_role(&self, role: Role) -> bool {
        self.roles.has(role)
    }

    /// True once the user has picked at least one role
    pub fn is_onboarded(&self) -> bool {
        !self.roles.is_empty()
    }

    /// Reject the request unless the user holds `role`
    pub fn require_role(&self, role: Role) -> Result<(), AuthError> {
        if self.has_role(role) {
            Ok(())
        } else {
            Err(AuthError::MissingRole(role))
        }
    }
}
