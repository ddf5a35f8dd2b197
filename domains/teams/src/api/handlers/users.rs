//! User account and directory handlers
//!
//! - GET /v1/account - Current user with roles
//! - POST /v1/account/roles - Pick roles during onboarding
//! - GET /v1/users/drivers - Teamless drivers (managers only)
//! - GET /v1/users/social-media - Unassigned social media managers (managers only)

use axum::{
    extract::{Query, State},
    Json,
};
use pitwall_auth::{AuthUser, ManagerUser, Role, RoleSet};
use pitwall_common::{Error, Result, SearchQuery, ValidatedJson};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::api::middleware::TeamsState;
use crate::UserSummary;

/// Profile of the authenticated user
#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub id: Uuid,
    pub email: String,
    pub name: Option<String>,
    pub team_id: Option<Uuid>,
    pub roles: RoleSet,
    /// False until the user has picked roles
    pub onboarded: bool,
}

/// Request for assigning roles
#[derive(Debug, Deserialize, Validate)]
pub struct AssignRolesRequest {
    #[validate(length(min = 1, message = "Please select at least one role"))]
    pub roles: Vec<Role>,
}

/// GET /v1/account - Get current user profile
pub async fn get_profile(
    AuthUser(ctx): AuthUser,
    State(state): State<TeamsState>,
) -> Result<Json<ProfileResponse>> {
    let team_id = state
        .repos
        .users
        .get_by_id(ctx.user.id)
        .await?
        .and_then(|u| u.team_id);

    Ok(Json(ProfileResponse {
        id: ctx.user.id,
        email: ctx.user.email,
        name: ctx.user.name,
        team_id,
        onboarded: !ctx.roles.is_empty(),
        roles: ctx.roles,
    }))
}

/// POST /v1/account/roles - Assign roles (connect-or-create, idempotent)
pub async fn assign_roles(
    AuthUser(ctx): AuthUser,
    State(state): State<TeamsState>,
    ValidatedJson(request): ValidatedJson<AssignRolesRequest>,
) -> Result<Json<ProfileResponse>> {
    let requested: RoleSet = request.roles.into_iter().collect();

    let roles = state
        .repos
        .users
        .assign_roles(ctx.user.id, &requested)
        .await?;

    tracing::info!(user_id = %ctx.user.id, roles = ?roles, "Roles assigned");

    let team_id = state
        .repos
        .users
        .get_by_id(ctx.user.id)
        .await?
        .and_then(|u| u.team_id);

    Ok(Json(ProfileResponse {
        id: ctx.user.id,
        email: ctx.user.email,
        name: ctx.user.name,
        team_id,
        onboarded: !roles.is_empty(),
        roles,
    }))
}

/// GET /v1/users/drivers?q= - Drivers available for a new team
///
/// Unlike event queries, an empty match is reported as 404.
pub async fn get_drivers(
    ManagerUser(_ctx): ManagerUser,
    State(state): State<TeamsState>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<Vec<UserSummary>>> {
    let drivers = state
        .repos
        .users
        .search_free_drivers(query.term(), query.limit())
        .await?;

    non_empty(drivers, "No drivers found").map(Json)
}

/// GET /v1/users/social-media?q= - Social media managers available for a new team
pub async fn get_social_media(
    ManagerUser(_ctx): ManagerUser,
    State(state): State<TeamsState>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<Vec<UserSummary>>> {
    let users = state
        .repos
        .users
        .search_free_social_media(query.term(), query.limit())
        .await?;

    non_empty(users, "No social media managers found").map(Json)
}

fn non_empty<T>(items: Vec<T>, message: &str) -> Result<Vec<T>> {
    if items.is_empty() {
        Err(Error::NotFound(message.to_string()))
    } else {
        Ok(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assign_roles_requires_one_role() {
        let request: AssignRolesRequest = serde_json::from_str(r#"{"roles": []}"#).unwrap();
        assert!(request.validate().is_err());

        let request: AssignRolesRequest =
            serde_json::from_str(r#"{"roles": ["driver", "socialMedia"]}"#).unwrap();
        assert!(request.validate().is_ok());
        assert_eq!(request.roles, vec![Role::Driver, Role::SocialMedia]);
    }

    #[test]
    fn test_assign_roles_rejects_unknown_role() {
        let parsed = serde_json::from_str::<AssignRolesRequest>(r#"{"roles": ["pitcrew"]}"#);
        assert!(parsed.is_err());
    }

    #[test]
    fn test_empty_directory_search_is_not_found() {
        let err = non_empty(Vec::<UserSummary>::new(), "No drivers found").unwrap_err();
        assert!(matches!(err, Error::NotFound(msg) if msg == "No drivers found"));

        let found = non_empty(vec![1, 2], "unused").unwrap();
        assert_eq!(found, vec![1, 2]);
    }
}
