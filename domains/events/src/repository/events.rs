//! Postgres event store

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use pitwall_common::{RepositoryError, Result};
use sqlx::{PgPool, Postgres, QueryBuilder, Transaction};
use uuid::Uuid;

use super::EventStore;
use crate::domain::entities::{
    Championship, ChampionshipSummary, Event, EventDriver, EventPatch, EventResult, EventTeam,
    EventType, NewChampionship, NewEvent, ResultInput,
};
use crate::domain::scope::{EventFilter, EventScope, TeamLookup};

/// Event columns joined with championship and result columns
const EVENT_SELECT: &str = r#"
    SELECT e.id, e.title, e.date, e.type AS event_type, e.car, e.track, e.duration,
           e.manager_id, e.championship_id, e.team_id, e.created_at, e.updated_at,
           c.name AS championship_name, c.organizer AS championship_organizer,
           r.position AS result_position, r.fastest_lap_ms AS result_fastest_lap_ms,
           r.notes AS result_notes, r.recorded_by AS result_recorded_by,
           r.recorded_at AS result_recorded_at
    FROM events e
    LEFT JOIN championships c ON c.id = e.championship_id
    LEFT JOIN results r ON r.event_id = e.id
"#;

const RESULT_COLUMNS: &str = "event_id, position, fastest_lap_ms, notes, recorded_by, recorded_at";

const CHAMPIONSHIP_COLUMNS: &str = "id, name, organizer, manager_id, created_at";

const TEAM_SELECT: &str = r#"
    SELECT t.id, t.name, t.manager_id, t.social_media_id,
           ARRAY(SELECT u.id FROM users u WHERE u.team_id = t.id ORDER BY u.id) AS driver_ids
    FROM teams t
"#;

#[derive(Debug, sqlx::FromRow)]
struct EventRow {
    id: Uuid,
    title: Option<String>,
    date: DateTime<Utc>,
    event_type: EventType,
    car: String,
    track: String,
    duration: i32,
    manager_id: Option<Uuid>,
    championship_id: Option<Uuid>,
    team_id: Option<Uuid>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    championship_name: Option<String>,
    championship_organizer: Option<String>,
    result_position: Option<i32>,
    result_fastest_lap_ms: Option<i32>,
    result_notes: Option<String>,
    result_recorded_by: Option<Uuid>,
    result_recorded_at: Option<DateTime<Utc>>,
}

impl EventRow {
    fn into_event(self, drivers: Vec<EventDriver>) -> Event {
        let championship = match (self.championship_name, self.championship_organizer) {
            (Some(name), Some(organizer)) => Some(ChampionshipSummary { name, organizer }),
            _ => None,
        };

        let result = match (
            self.result_position,
            self.result_recorded_by,
            self.result_recorded_at,
        ) {
            (Some(position), Some(recorded_by), Some(recorded_at)) => Some(EventResult {
                event_id: self.id,
                position,
                fastest_lap_ms: self.result_fastest_lap_ms,
                notes: self.result_notes,
                recorded_by,
                recorded_at,
            }),
            _ => None,
        };

        Event {
            id: self.id,
            title: self.title,
            date: self.date,
            event_type: self.event_type,
            car: self.car,
            track: self.track,
            duration: self.duration,
            manager_id: self.manager_id,
            championship_id: self.championship_id,
            team_id: self.team_id,
            drivers,
            championship,
            result,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct DriverRow {
    event_id: Uuid,
    id: Uuid,
    name: Option<String>,
    team_id: Option<Uuid>,
}

/// Append the scope predicate for `e` to a query that already has a WHERE clause
fn push_scope(builder: &mut QueryBuilder<'_, Postgres>, scope: &EventScope) {
    match *scope {
        EventScope::Driving { driver_id } => {
            builder.push(
                " AND EXISTS (SELECT 1 FROM event_drivers ed \
                 WHERE ed.event_id = e.id AND ed.driver_id = ",
            );
            builder.push_bind(driver_id);
            builder.push(")");
        }
        EventScope::Managing { manager_id } => {
            builder.push(" AND e.manager_id = ");
            builder.push_bind(manager_id);
        }
        EventScope::Team { team_id, viewer_id } => {
            // Every driver is on the team; e.team_id is not consulted
            builder.push(
                " AND EXISTS (SELECT 1 FROM event_drivers ed WHERE ed.event_id = e.id) \
                 AND NOT EXISTS (SELECT 1 FROM event_drivers ed \
                 INNER JOIN users u ON u.id = ed.driver_id \
                 WHERE ed.event_id = e.id AND u.team_id IS DISTINCT FROM ",
            );
            builder.push_bind(team_id);
            builder.push(")");

            if let Some(viewer_id) = viewer_id {
                builder.push(" AND e.manager_id IS DISTINCT FROM ");
                builder.push_bind(viewer_id);
                builder.push(
                    " AND NOT (EXISTS (SELECT 1 FROM event_drivers ed \
                     WHERE ed.event_id = e.id AND ed.driver_id = ",
                );
                builder.push_bind(viewer_id);
                builder.push(
                    ") AND NOT EXISTS (SELECT 1 FROM event_drivers ed \
                     WHERE ed.event_id = e.id AND ed.driver_id <> ",
                );
                builder.push_bind(viewer_id);
                builder.push("))");
            }
        }
    }
}

/// Compile a filter into a complete, ordered event query
fn filter_query(filter: &EventFilter) -> QueryBuilder<'static, Postgres> {
    let mut builder = QueryBuilder::new(EVENT_SELECT);

    builder.push(" WHERE e.date >= ");
    builder.push_bind(filter.range().start());
    builder.push(" AND e.date < ");
    builder.push_bind(filter.range().end_exclusive());

    push_scope(&mut builder, filter.scope());

    if filter.results_only() {
        builder.push(" AND r.event_id IS NOT NULL");
    }

    builder.push(" ORDER BY e.date ASC, e.id ASC");
    builder
}

async fn insert_drivers_tx(
    transaction: &mut Transaction<'_, Postgres>,
    event_id: Uuid,
    driver_ids: &[Uuid],
) -> std::result::Result<(), RepositoryError> {
    sqlx::query(
        "INSERT INTO event_drivers (event_id, driver_id) \
         SELECT $1, unnest($2::uuid[]) ON CONFLICT DO NOTHING",
    )
    .bind(event_id)
    .bind(driver_ids)
    .execute(&mut **transaction)
    .await
    .map_err(RepositoryError::from_sqlx)?;

    Ok(())
}

#[derive(Clone)]
pub struct PgEventStore {
    pool: PgPool,
}

impl PgEventStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Attach drivers to already-loaded event rows
    async fn hydrate(&self, rows: Vec<EventRow>) -> Result<Vec<Event>> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<Uuid> = rows.iter().map(|row| row.id).collect();
        let driver_rows = sqlx::query_as::<_, DriverRow>(
            r#"
            SELECT ed.event_id, u.id, u.name, u.team_id
            FROM event_drivers ed
            INNER JOIN users u ON u.id = ed.driver_id
            WHERE ed.event_id = ANY($1)
            ORDER BY u.name ASC NULLS LAST, u.id ASC
            "#,
        )
        .bind(ids.as_slice())
        .fetch_all(&self.pool)
        .await?;

        let mut drivers: HashMap<Uuid, Vec<EventDriver>> = HashMap::new();
        for row in driver_rows {
            drivers.entry(row.event_id).or_default().push(EventDriver {
                id: row.id,
                name: row.name,
                team_id: row.team_id,
            });
        }

        Ok(rows
            .into_iter()
            .map(|row| {
                let event_drivers = drivers.remove(&row.id).unwrap_or_default();
                row.into_event(event_drivers)
            })
            .collect())
    }

    async fn require_event(&self, id: Uuid) -> Result<Event> {
        self.find_event(id)
            .await?
            .ok_or_else(|| RepositoryError::NotFound.into())
    }
}

#[async_trait]
impl EventStore for PgEventStore {
    async fn find_events(&self, filter: &EventFilter) -> Result<Vec<Event>> {
        let mut builder = filter_query(filter);
        let rows = builder
            .build_query_as::<EventRow>()
            .fetch_all(&self.pool)
            .await?;

        tracing::debug!(
            view = ?filter.scope().view(),
            from = %filter.range().first_day(),
            to = %filter.range().last_day(),
            count = rows.len(),
            "Loaded events"
        );

        self.hydrate(rows).await
    }

    async fn find_event(&self, id: Uuid) -> Result<Option<Event>> {
        let query = format!("{EVENT_SELECT} WHERE e.id = $1");
        let row = sqlx::query_as::<_, EventRow>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => Ok(self.hydrate(vec![row]).await?.pop()),
            None => Ok(None),
        }
    }

    async fn create_event(&self, event: NewEvent) -> Result<Event> {
        let id = Uuid::new_v4();
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO events (id, title, date, type, car, track, duration,
                                manager_id, championship_id, team_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(id)
        .bind(&event.title)
        .bind(event.date)
        .bind(event.event_type)
        .bind(&event.car)
        .bind(&event.track)
        .bind(event.duration)
        .bind(event.manager_id)
        .bind(event.championship_id)
        .bind(event.team_id)
        .execute(&mut *tx)
        .await
        .map_err(RepositoryError::from_sqlx)?;

        insert_drivers_tx(&mut tx, id, &event.driver_ids).await?;

        tx.commit().await?;

        self.require_event(id).await
    }

    async fn update_event(&self, id: Uuid, patch: EventPatch) -> Result<Event> {
        let mut tx = self.pool.begin().await?;

        let updated = sqlx::query(
            r#"
            UPDATE events
            SET title = COALESCE($2, title),
                date = COALESCE($3, date),
                type = $4,
                car = COALESCE($5, car),
                track = COALESCE($6, track),
                duration = COALESCE($7, duration),
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(&patch.title)
        .bind(patch.date)
        .bind(patch.event_type)
        .bind(&patch.car)
        .bind(&patch.track)
        .bind(patch.duration)
        .execute(&mut *tx)
        .await
        .map_err(RepositoryError::from_sqlx)?;

        if updated.rows_affected() == 0 {
            return Err(RepositoryError::NotFound.into());
        }

        if let Some(driver_ids) = &patch.driver_ids {
            sqlx::query("DELETE FROM event_drivers WHERE event_id = $1")
                .bind(id)
                .execute(&mut *tx)
                .await?;
            insert_drivers_tx(&mut tx, id, driver_ids).await?;
        }

        tx.commit().await?;

        self.require_event(id).await
    }

    async fn delete_event(&self, id: Uuid) -> Result<()> {
        let deleted = sqlx::query("DELETE FROM events WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if deleted.rows_affected() == 0 {
            return Err(RepositoryError::NotFound.into());
        }
        Ok(())
    }

    async fn find_team(&self, lookup: &TeamLookup) -> Result<Option<EventTeam>> {
        let clause = match lookup {
            TeamLookup::DriverOrManager { .. } => {
                "WHERE EXISTS (SELECT 1 FROM users u WHERE u.id = $1 AND u.team_id = t.id) \
                 OR t.manager_id = $1 \
                 ORDER BY CASE WHEN t.manager_id = $1 THEN 1 ELSE 0 END, t.id"
            }
            TeamLookup::Driver { .. } => {
                "WHERE EXISTS (SELECT 1 FROM users u WHERE u.id = $1 AND u.team_id = t.id)"
            }
            TeamLookup::Manager { .. } => "WHERE t.manager_id = $1",
            TeamLookup::SocialMedia { .. } => "WHERE t.social_media_id = $1",
        };

        let query = format!("{TEAM_SELECT} {clause} LIMIT 1");
        let team = sqlx::query_as::<_, EventTeam>(&query)
            .bind(lookup.user_id())
            .fetch_optional(&self.pool)
            .await?;

        Ok(team)
    }

    async fn upsert_result(
        &self,
        event_id: Uuid,
        result: ResultInput,
        recorded_by: Uuid,
    ) -> Result<EventResult> {
        let query = format!(
            r#"
            INSERT INTO results ({RESULT_COLUMNS})
            VALUES ($1, $2, $3, $4, $5, NOW())
            ON CONFLICT (event_id) DO UPDATE
            SET position = EXCLUDED.position,
                fastest_lap_ms = EXCLUDED.fastest_lap_ms,
                notes = EXCLUDED.notes,
                recorded_by = EXCLUDED.recorded_by,
                recorded_at = EXCLUDED.recorded_at
            RETURNING {RESULT_COLUMNS}
            "#
        );

        let stored = sqlx::query_as::<_, EventResult>(&query)
            .bind(event_id)
            .bind(result.position)
            .bind(result.fastest_lap_ms)
            .bind(&result.notes)
            .bind(recorded_by)
            .fetch_one(&self.pool)
            .await
            .map_err(RepositoryError::from_sqlx)?;

        Ok(stored)
    }

    async fn find_championship(&self, id: Uuid) -> Result<Option<Championship>> {
        let query = format!("SELECT {CHAMPIONSHIP_COLUMNS} FROM championships WHERE id = $1");
        let championship = sqlx::query_as::<_, Championship>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(championship)
    }

    async fn create_championship(&self, championship: NewChampionship) -> Result<Championship> {
        let query = format!(
            "INSERT INTO championships (id, name, organizer, manager_id) \
             VALUES ($1, $2, $3, $4) RETURNING {CHAMPIONSHIP_COLUMNS}"
        );
        let created = sqlx::query_as::<_, Championship>(&query)
            .bind(Uuid::new_v4())
            .bind(&championship.name)
            .bind(&championship.organizer)
            .bind(championship.manager_id)
            .fetch_one(&self.pool)
            .await
            .map_err(RepositoryError::from_sqlx)?;

        Ok(created)
    }

    async fn list_championships(&self) -> Result<Vec<Championship>> {
        let query =
            format!("SELECT {CHAMPIONSHIP_COLUMNS} FROM championships ORDER BY name ASC, id ASC");
        let championships = sqlx::query_as::<_, Championship>(&query)
            .fetch_all(&self.pool)
            .await?;

        Ok(championships)
    }
}
