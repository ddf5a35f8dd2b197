//! Team management API handlers
//!
//! A manager creates exactly one team, choosing teamless drivers and
//! optionally an unassigned social media manager.

use axum::{extract::State, http::StatusCode, Json};
use chrono::{DateTime, Utc};
use pitwall_auth::ManagerUser;
use pitwall_common::{Error, RepositoryError, Result, ValidatedJson};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::api::middleware::TeamsState;
use crate::repository::{
    assign_drivers_tx, create_team_tx, is_free_social_media_tx, lock_free_drivers_tx,
    manages_team_tx,
};
use crate::{normalize_driver_ids, Team, UserSummary};

/// Request for creating a new team
#[derive(Debug, Deserialize, Validate)]
pub struct CreateTeamRequest {
    /// Team display name (3-100 chars)
    #[validate(length(min = 3, max = 100))]
    pub name: String,

    /// Drivers to enroll; each must be a driver without a team
    #[serde(default)]
    pub driver_ids: Vec<Uuid>,

    /// Optional social media manager
    pub social_media_id: Option<Uuid>,
}

/// Team response for API operations
#[derive(Debug, Serialize)]
pub struct TeamResponse {
    pub id: Uuid,
    pub name: String,
    pub manager_id: Uuid,
    pub social_media: Option<UserSummary>,
    pub drivers: Vec<UserSummary>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TeamResponse {
    fn new(team: Team, social_media: Option<UserSummary>, drivers: Vec<UserSummary>) -> Self {
        Self {
            id: team.id,
            name: team.name,
            manager_id: team.manager_id,
            social_media,
            drivers,
            created_at: team.created_at,
            updated_at: team.updated_at,
        }
    }
}

/// Requested ids missing from the eligible set, in request order
fn ineligible(requested: &[Uuid], eligible: &[Uuid]) -> Vec<Uuid> {
    requested
        .iter()
        .filter(|id| !eligible.contains(id))
        .copied()
        .collect()
}

/// Create a new team
///
/// **POST /v1/teams**
///
/// **Business Rules:**
/// - A manager manages at most one team
/// - Each driver holds the driver role and belongs to no other team
/// - The social media manager holds the role and covers no other team
pub async fn create_team(
    ManagerUser(ctx): ManagerUser,
    State(state): State<TeamsState>,
    ValidatedJson(request): ValidatedJson<CreateTeamRequest>,
) -> Result<(StatusCode, Json<TeamResponse>)> {
    let manager_id = ctx.user.id;
    let team = Team::new(&request.name, manager_id, request.social_media_id)?;
    let driver_ids = normalize_driver_ids(&request.driver_ids, manager_id)?;

    let mut tx = state.repos.begin().await?;

    if manages_team_tx(&mut tx, manager_id).await? {
        return Err(Error::Conflict("You already manage a team".to_string()));
    }

    let free_drivers = lock_free_drivers_tx(&mut tx, &driver_ids).await?;
    let unavailable = ineligible(&driver_ids, &free_drivers);
    if !unavailable.is_empty() {
        return Err(Error::Conflict(format!(
            "Drivers are not available for a new team: {}",
            unavailable
                .iter()
                .map(Uuid::to_string)
                .collect::<Vec<_>>()
                .join(", ")
        )));
    }

    if let Some(social_media_id) = team.social_media_id {
        if !is_free_social_media_tx(&mut tx, social_media_id).await? {
            return Err(Error::Conflict(
                "Social media manager is not available".to_string(),
            ));
        }
    }

    let created = create_team_tx(&mut tx, &team)
        .await
        .map_err(|e| match e {
            RepositoryError::AlreadyExists => {
                Error::Conflict("You already manage a team".to_string())
            }
            other => other.into(),
        })?;

    assign_drivers_tx(&mut tx, created.id, &driver_ids).await?;

    tx.commit().await?;

    tracing::info!(
        team_id = %created.id,
        manager_id = %manager_id,
        drivers = driver_ids.len(),
        "Team created"
    );

    let response = load_team_response(&state, created).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// Team the caller manages
///
/// **GET /v1/teams/managing**
///
/// Returns `null` when the manager has not created a team yet.
pub async fn get_managing_for(
    ManagerUser(ctx): ManagerUser,
    State(state): State<TeamsState>,
) -> Result<Json<Option<TeamResponse>>> {
    let team = state.repos.teams.find_managed_by(ctx.user.id).await?;

    let response = match team {
        Some(team) => Some(load_team_response(&state, team).await?),
        None => None,
    };

    Ok(Json(response))
}

async fn load_team_response(state: &TeamsState, team: Team) -> Result<TeamResponse> {
    let drivers = state.repos.teams.list_drivers(team.id).await?;
    let social_media = match team.social_media_id {
        Some(id) => state.repos.teams.find_user_summary(id).await?,
        None => None,
    };

    Ok(TeamResponse::new(team, social_media, drivers))
}
