//! Role model and role resolution
//!
//! A principal holds a set of [`Role`]s. Membership checks are explicit:
//! [`RoleSet::has_all`] requires every role, [`RoleSet::has_any`] requires one.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use crate::context::AuthContext;

/// Role a user can hold on the dashboard
///
/// Declaration order is the primary-role precedence: driver, manager, social media.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "camelCase")]
pub enum Role {
    Driver,
    Manager,
    SocialMedia,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::Driver, Role::Manager, Role::SocialMedia];

    /// Stored role name
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Driver => "driver",
            Role::Manager => "manager",
            Role::SocialMedia => "socialMedia",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error for role names outside the known set
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown role: {0}")]
pub struct UnknownRole(pub String);

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::ALL
            .into_iter()
            .find(|role| role.as_str() == s)
            .ok_or_else(|| UnknownRole(s.to_string()))
    }
}

/// Set of roles held by a principal
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoleSet(BTreeSet<Role>);

impl RoleSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from stored role names, skipping names that are not roles
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        names
            .into_iter()
            .filter_map(|name| match name.as_ref().parse::<Role>() {
                Ok(role) => Some(role),
                Err(e) => {
                    tracing::warn!(error = %e, "Ignoring unrecognised stored role");
                    None
                }
            })
            .collect()
    }

    /// Add a role; returns false if it was already present
    pub fn insert(&mut self, role: Role) -> bool {
        self.0.insert(role)
    }

    pub fn has(&self, role: Role) -> bool {
        self.0.contains(&role)
    }

    /// True iff every role in `roles` is held. Vacuously true for an empty slice.
    pub fn has_all(&self, roles: &[Role]) -> bool {
        roles.iter().all(|r| self.has(*r))
    }

    /// True iff at least one role in `roles` is held
    pub fn has_any(&self, roles: &[Role]) -> bool {
        roles.iter().any(|r| self.has(*r))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = Role> + '_ {
        self.0.iter().copied()
    }

    /// Role that decides the default event view
    pub fn primary(&self) -> Option<Role> {
        self.0.iter().next().copied()
    }
}

impl FromIterator<Role> for RoleSet {
    fn from_iter<T: IntoIterator<Item = Role>>(iter: T) -> Self {
        RoleSet(iter.into_iter().collect())
    }
}

impl Extend<Role> for RoleSet {
    fn extend<T: IntoIterator<Item = Role>>(&mut self, iter: T) {
        self.0.extend(iter)
    }
}

/// Effective roles of a principal; empty when there is none
pub fn resolve(principal: Option<&AuthContext>) -> RoleSet {
    principal.map(|p| p.roles.clone()).unwrap_or_default()
}

/// Whether a possibly-absent principal holds `role`
pub fn has_role(principal: Option<&AuthContext>, role: Role) -> bool {
    principal.is_some_and(|p| p.roles.has(role))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::AuthIdentity;
    use chrono::Utc;
    use uuid::Uuid;

    fn principal(roles: &[Role]) -> AuthContext {
        AuthContext::new(
            AuthIdentity {
                id: Uuid::new_v4(),
                email: "driver@pitwall.test".to_string(),
                name: Some("Test Driver".to_string()),
                created_at: Utc::now(),
                updated_at: Utc::now(),
            },
            roles.iter().copied().collect(),
        )
    }

    #[test]
    fn test_role_names_round_trip_through_storage_form() {
        for role in Role::ALL {
            assert_eq!(role.as_str().parse::<Role>().unwrap(), role);
        }
        assert_eq!(Role::SocialMedia.to_string(), "socialMedia");
        assert!("socialmedia".parse::<Role>().is_err());
    }

    #[test]
    fn test_role_serde_uses_camel_case() {
        let json = serde_json::to_string(&Role::SocialMedia).unwrap();
        assert_eq!(json, "\"socialMedia\"");
        let roles: Vec<Role> = serde_json::from_str(r#"["driver","manager"]"#).unwrap();
        assert_eq!(roles, vec![Role::Driver, Role::Manager]);
    }

    #[test]
    fn test_has_all_is_and_has_any_is_or() {
        let roles: RoleSet = [Role::Driver].into_iter().collect();

        assert!(roles.has_all(&[Role::Driver]));
        assert!(!roles.has_all(&[Role::Driver, Role::Manager]));
        assert!(roles.has_any(&[Role::Driver, Role::Manager]));
        assert!(!roles.has_any(&[Role::Manager, Role::SocialMedia]));
    }

    #[test]
    fn test_empty_role_queries() {
        let roles = RoleSet::new();
        assert!(roles.has_all(&[]));
        assert!(!roles.has_any(&[]));
        assert!(roles.primary().is_none());
    }

    #[test]
    fn test_from_names_skips_unknown() {
        let roles = RoleSet::from_names(["manager", "pitcrew", "driver"]);
        assert_eq!(roles.len(), 2);
        assert!(roles.has(Role::Driver));
        assert!(roles.has(Role::Manager));
    }

    #[test]
    fn test_insert_is_idempotent() {
        let mut roles = RoleSet::new();
        assert!(roles.insert(Role::Manager));
        assert!(!roles.insert(Role::Manager));
        assert_eq!(roles.len(), 1);
    }

    #[test]
    fn test_primary_prefers_driver_then_manager() {
        let all: RoleSet = Role::ALL.into_iter().collect();
        assert_eq!(all.primary(), Some(Role::Driver));

        let staff: RoleSet = [Role::SocialMedia, Role::Manager].into_iter().collect();
        assert_eq!(staff.primary(), Some(Role::Manager));
    }

    #[test]
    fn test_absent_principal_has_no_roles() {
        assert!(resolve(None).is_empty());
        assert!(!has_role(None, Role::Driver));
    }

    #[test]
    fn test_resolve_returns_principal_roles() {
        let ctx = principal(&[Role::Manager]);
        assert!(has_role(Some(&ctx), Role::Manager));
        assert!(!has_role(Some(&ctx), Role::Driver));
        assert_eq!(resolve(Some(&ctx)).len(), 1);
    }
}
