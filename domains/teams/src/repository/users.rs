//! User repository

use crate::domain::entities::{User, UserSummary};
use pitwall_auth::{Role, RoleSet};
use pitwall_common::Result;
use sqlx::PgPool;
use uuid::Uuid;

/// Case-insensitive "name contains term" with no LIKE escaping concerns
const NAME_CONTAINS: &str = "position(lower($1) IN lower(COALESCE(u.name, ''))) > 0";

#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Get user by ID
    pub async fn get_by_id(&self, id: Uuid) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, name, team_id, created_at, updated_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// Current role set of a user
    pub async fn roles_of(&self, user_id: Uuid) -> Result<RoleSet> {
        let names: Vec<String> = sqlx::query_scalar(
            r#"
            SELECT r.name
            FROM roles r
            INNER JOIN user_roles ur ON ur.role_id = r.id
            WHERE ur.user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(RoleSet::from_names(names))
    }

    /// Connect the user to each role, creating role rows that do not exist yet.
    ///
    /// Existing assignments are left untouched, so repeating the call with the
    /// same roles is a no-op. Returns the full resulting role set.
    pub async fn assign_roles(&self, user_id: Uuid, roles: &RoleSet) -> Result<RoleSet> {
        let names: Vec<String> = roles.iter().map(|r| r.as_str().to_string()).collect();

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO roles (name)
            SELECT unnest($1::text[])
            ON CONFLICT (name) DO NOTHING
            "#,
        )
        .bind(names.as_slice())
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            INSERT INTO user_roles (user_id, role_id)
            SELECT $1, r.id FROM roles r WHERE r.name = ANY($2)
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(user_id)
        .bind(names.as_slice())
        .execute(&mut *tx)
        .await?;

        sqlx::query("UPDATE users SET updated_at = NOW() WHERE id = $1")
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        self.roles_of(user_id).await
    }

    /// Drivers whose name contains `term` and who are not on a team yet
    pub async fn search_free_drivers(&self, term: &str, limit: i64) -> Result<Vec<UserSummary>> {
        let query = format!(
            r#"
            SELECT u.id, u.name
            FROM users u
            WHERE {NAME_CONTAINS}
              AND u.team_id IS NULL
              AND EXISTS (
                  SELECT 1 FROM user_roles ur
                  INNER JOIN roles r ON r.id = ur.role_id
                  WHERE ur.user_id = u.id AND r.name = $2
              )
            ORDER BY u.name ASC NULLS LAST
            LIMIT $3
            "#
        );
        let drivers = sqlx::query_as::<_, UserSummary>(&query)
            .bind(term)
            .bind(Role::Driver.as_str())
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        Ok(drivers)
    }

    /// Social media managers whose name contains `term` and who cover no team yet
    pub async fn search_free_social_media(
        &self,
        term: &str,
        limit: i64,
    ) -> Result<Vec<UserSummary>> {
        let query = format!(
            r#"
            SELECT u.id, u.name
            FROM users u
            WHERE {NAME_CONTAINS}
              AND NOT EXISTS (SELECT 1 FROM teams t WHERE t.social_media_id = u.id)
              AND EXISTS (
                  SELECT 1 FROM user_roles ur
                  INNER JOIN roles r ON r.id = ur.role_id
                  WHERE ur.user_id = u.id AND r.name = $2
              )
            ORDER BY u.name ASC NULLS LAST
            LIMIT $3
            "#
        );
        let users = sqlx::query_as::<_, UserSummary>(&query)
            .bind(term)
            .bind(Role::SocialMedia.as_str())
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        Ok(users)
    }
}
