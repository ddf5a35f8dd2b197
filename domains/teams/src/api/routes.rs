//! Route definitions for Teams domain API

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers::{teams, users};
use super::middleware::TeamsState;

/// Account and onboarding routes
fn account_routes() -> Router<TeamsState> {
    Router::new()
        .route("/v1/account", get(users::get_profile))
        .route("/v1/account/roles", post(users::assign_roles))
}

/// User directory routes (managers looking for staff)
fn directory_routes() -> Router<TeamsState> {
    Router::new()
        .route("/v1/users/drivers", get(users::get_drivers))
        .route("/v1/users/social-media", get(users::get_social_media))
}

/// Team management routes
fn team_routes() -> Router<TeamsState> {
    Router::new()
        .route("/v1/teams", post(teams::create_team))
        .route("/v1/teams/managing", get(teams::get_managing_for))
}

/// Create all Teams domain API routes
pub fn routes() -> Router<TeamsState> {
    Router::new()
        .merge(account_routes())
        .merge(directory_routes())
        .merge(team_routes())
}
