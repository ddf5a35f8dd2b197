//! Transactional helpers for team creation
//!
//! Eligibility checks lock the candidate user rows so a driver cannot be
//! claimed by two teams created concurrently.

use crate::domain::entities::Team;
use crate::repository::teams::TEAM_COLUMNS;
use pitwall_auth::Role;
use pitwall_common::RepositoryError;
use sqlx::{Postgres, Transaction};
use uuid::Uuid;

/// Ids among `driver_ids` that hold the driver role and have no team, locked for update
pub async fn lock_free_drivers_tx(
    transaction: &mut Transaction<'_, Postgres>,
    driver_ids: &[Uuid],
) -> Result<Vec<Uuid>, RepositoryError> {
    let ids: Vec<Uuid> = sqlx::query_scalar(
        r#"
        SELECT u.id
        FROM users u
        WHERE u.id = ANY($1)
          AND u.team_id IS NULL
          AND EXISTS (
              SELECT 1 FROM user_roles ur
              INNER JOIN roles r ON r.id = ur.role_id
              WHERE ur.user_id = u.id AND r.name = $2
          )
        FOR UPDATE OF u
        "#,
    )
    .bind(driver_ids)
    .bind(Role::Driver.as_str())
    .fetch_all(&mut **transaction)
    .await
    .map_err(RepositoryError::from_sqlx)?;

    Ok(ids)
}

/// Whether the user holds the social media role and covers no team
pub async fn is_free_social_media_tx(
    transaction: &mut Transaction<'_, Postgres>,
    user_id: Uuid,
) -> Result<bool, RepositoryError> {
    let free: bool = sqlx::query_scalar(
        r#"
        SELECT EXISTS (
            SELECT 1 FROM user_roles ur
            INNER JOIN roles r ON r.id = ur.role_id
            WHERE ur.user_id = $1 AND r.name = $2
        ) AND NOT EXISTS (
            SELECT 1 FROM teams t WHERE t.social_media_id = $1
        )
        "#,
    )
    .bind(user_id)
    .bind(Role::SocialMedia.as_str())
    .fetch_one(&mut **transaction)
    .await
    .map_err(RepositoryError::from_sqlx)?;

    Ok(free)
}

/// Whether the user already manages a team
pub async fn manages_team_tx(
    transaction: &mut Transaction<'_, Postgres>,
    manager_id: Uuid,
) -> Result<bool, RepositoryError> {
    let exists: bool =
        sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM teams WHERE manager_id = $1)")
            .bind(manager_id)
            .fetch_one(&mut **transaction)
            .await
            .map_err(RepositoryError::from_sqlx)?;

    Ok(exists)
}

/// Insert a team; a second team for the same manager is `AlreadyExists`
pub async fn create_team_tx(
    transaction: &mut Transaction<'_, Postgres>,
    team: &Team,
) -> Result<Team, RepositoryError> {
    let query = format!(
        "INSERT INTO teams ({TEAM_COLUMNS}) VALUES ($1, $2, $3, $4, $5, $6) \
         RETURNING {TEAM_COLUMNS}"
    );
    let created = sqlx::query_as::<_, Team>(&query)
        .bind(team.id)
        .bind(&team.name)
        .bind(team.manager_id)
        .bind(team.social_media_id)
        .bind(team.created_at)
        .bind(team.updated_at)
        .fetch_one(&mut **transaction)
        .await
        .map_err(RepositoryError::from_sqlx)?;

    Ok(created)
}

/// Attach drivers to a team
pub async fn assign_drivers_tx(
    transaction: &mut Transaction<'_, Postgres>,
    team_id: Uuid,
    driver_ids: &[Uuid],
) -> Result<u64, RepositoryError> {
    if driver_ids.is_empty() {
        return Ok(0);
    }

    let result =
        sqlx::query("UPDATE users SET team_id = $1, updated_at = NOW() WHERE id = ANY($2)")
            .bind(team_id)
            .bind(driver_ids)
            .execute(&mut **transaction)
            .await
            .map_err(RepositoryError::from_sqlx)?;

    Ok(result.rows_affected())
}
