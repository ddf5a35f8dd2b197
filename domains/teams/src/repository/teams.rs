//! Team repository

use crate::domain::entities::{Team, UserSummary};
use pitwall_common::Result;
use sqlx::PgPool;
use uuid::Uuid;

/// Columns of the teams table, used for SELECT and RETURNING clauses
pub(crate) const TEAM_COLUMNS: &str =
    "id, name, manager_id, social_media_id, created_at, updated_at";

#[derive(Clone)]
pub struct TeamRepository {
    pool: PgPool,
}

impl TeamRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find team by ID
    pub async fn get_by_id(&self, team_id: Uuid) -> Result<Option<Team>> {
        let query = format!("SELECT {TEAM_COLUMNS} FROM teams WHERE id = $1");
        let team = sqlx::query_as::<_, Team>(&query)
            .bind(team_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(team)
    }

    /// Team managed by the given user, if any
    pub async fn find_managed_by(&self, manager_id: Uuid) -> Result<Option<Team>> {
        let query = format!("SELECT {TEAM_COLUMNS} FROM teams WHERE manager_id = $1");
        let team = sqlx::query_as::<_, Team>(&query)
            .bind(manager_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(team)
    }

    /// Drivers of a team, ordered by name
    pub async fn list_drivers(&self, team_id: Uuid) -> Result<Vec<UserSummary>> {
        let drivers = sqlx::query_as::<_, UserSummary>(
            r#"
            SELECT id, name
            FROM users
            WHERE team_id = $1
            ORDER BY name ASC NULLS LAST
            "#,
        )
        .bind(team_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(drivers)
    }

    /// Summary of a single user (social media manager display)
    pub async fn find_user_summary(&self, user_id: Uuid) -> Result<Option<UserSummary>> {
        let user = sqlx::query_as::<_, UserSummary>("SELECT id, name FROM users WHERE id = $1")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }
}
