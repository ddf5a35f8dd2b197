//! Domain entities for the Pitwall teams domain
//!
//! Users carry at most one driving team; a team has exactly one manager and
//! at most one social media manager.

use chrono::{DateTime, Utc};
use pitwall_common::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use uuid::Uuid;

/// Team name length bounds (trimmed)
pub const TEAM_NAME_MIN: usize = 3;
pub const TEAM_NAME_MAX: usize = 100;

/// Maximum number of drivers in one team
pub const MAX_TEAM_DRIVERS: usize = 20;

/// User entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub name: Option<String>,
    /// Team the user drives for
    pub team_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Id and display name, as returned by directory searches
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct UserSummary {
    pub id: Uuid,
    pub name: Option<String>,
}

/// Team entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Team {
    pub id: Uuid,
    pub name: String,
    pub manager_id: Uuid,
    pub social_media_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Team {
    /// Create a new team managed by `manager_id`
    pub fn new(name: &str, manager_id: Uuid, social_media_id: Option<Uuid>) -> Result<Self> {
        let name = Self::validate_name(name)?;

        if social_media_id == Some(manager_id) {
            return Err(Error::Validation(
                "The manager cannot also be the team's social media manager".to_string(),
            ));
        }

        let now = Utc::now();
        Ok(Team {
            id: Uuid::new_v4(),
            name,
            manager_id,
            social_media_id,
            created_at: now,
            updated_at: now,
        })
    }

    /// Trim and bound-check a team name
    pub fn validate_name(name: &str) -> Result<String> {
        let trimmed = name.trim();
        let len = trimmed.chars().count();
        if !(TEAM_NAME_MIN..=TEAM_NAME_MAX).contains(&len) {
            return Err(Error::Validation(format!(
                "Team name must be {}-{} characters",
                TEAM_NAME_MIN, TEAM_NAME_MAX
            )));
        }
        Ok(trimmed.to_string())
    }
}

/// Deduplicate a requested driver list, keeping first-seen order.
///
/// The manager may not list themselves as a driver of their own team.
pub fn normalize_driver_ids(driver_ids: &[Uuid], manager_id: Uuid) -> Result<Vec<Uuid>> {
    let mut seen = BTreeSet::new();
    let drivers: Vec<Uuid> = driver_ids
        .iter()
        .copied()
        .filter(|id| seen.insert(*id))
        .collect();

    if drivers.contains(&manager_id) {
        return Err(Error::Validation(
            "A manager cannot drive for the team they manage".to_string(),
        ));
    }

    if drivers.len() > MAX_TEAM_DRIVERS {
        return Err(Error::Validation(format!(
            "A team can have at most {} drivers",
            MAX_TEAM_DRIVERS
        )));
    }

    Ok(drivers)
}
