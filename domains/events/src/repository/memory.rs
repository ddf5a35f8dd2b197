//! In-memory event store
//!
//! Evaluates [`EventFilter::matches`] over events held in a shared map. Users
//! and teams are seeded by the caller since the store owns neither.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::Utc;
use pitwall_common::{RepositoryError, Result};
use uuid::Uuid;

use super::EventStore;
use crate::domain::entities::{
    Championship, Event, EventDriver, EventPatch, EventResult, EventTeam, NewChampionship,
    NewEvent, ResultInput,
};
use crate::domain::scope::{EventFilter, TeamLookup};

#[derive(Debug, Clone)]
struct StoredTeam {
    name: String,
    manager_id: Uuid,
    social_media_id: Option<Uuid>,
}

/// Event row without its joined data
#[derive(Debug, Clone)]
struct StoredEvent {
    event: Event,
    driver_ids: Vec<Uuid>,
}

#[derive(Debug, Default)]
struct MemoryState {
    users: HashMap<Uuid, EventDriver>,
    teams: HashMap<Uuid, StoredTeam>,
    championships: HashMap<Uuid, Championship>,
    events: HashMap<Uuid, StoredEvent>,
    results: HashMap<Uuid, EventResult>,
}

impl MemoryState {
    fn team(&self, id: Uuid) -> Option<EventTeam> {
        let stored = self.teams.get(&id)?;
        let mut driver_ids: Vec<Uuid> = self
            .users
            .values()
            .filter(|u| u.team_id == Some(id))
            .map(|u| u.id)
            .collect();
        driver_ids.sort();

        Some(EventTeam {
            id,
            name: stored.name.clone(),
            manager_id: stored.manager_id,
            social_media_id: stored.social_media_id,
            driver_ids,
        })
    }

    fn check_users(&self, ids: &[Uuid]) -> Result<()> {
        if ids.iter().all(|id| self.users.contains_key(id)) {
            Ok(())
        } else {
            Err(RepositoryError::InvalidData("Referenced record does not exist".to_string()).into())
        }
    }

    /// Event with current driver, championship and result data
    fn hydrate(&self, stored: &StoredEvent) -> Event {
        let mut event = stored.event.clone();

        let mut drivers: Vec<EventDriver> = stored
            .driver_ids
            .iter()
            .filter_map(|id| self.users.get(id).cloned())
            .collect();
        drivers.sort_by(|a, b| {
            (a.name.is_none(), &a.name, a.id).cmp(&(b.name.is_none(), &b.name, b.id))
        });
        event.drivers = drivers;

        event.championship = event
            .championship_id
            .and_then(|id| self.championships.get(&id))
            .map(Championship::summary);
        event.result = self.results.get(&event.id).cloned();
        event
    }
}

/// First occurrence of each id, in order
fn unique(mut ids: Vec<Uuid>) -> Vec<Uuid> {
    let mut seen = HashSet::new();
    ids.retain(|id| seen.insert(*id));
    ids
}

/// Event store backed by process memory
#[derive(Clone, Default)]
pub struct InMemoryEventStore {
    state: Arc<Mutex<MemoryState>>,
}

impl InMemoryEventStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register a user that events can list as a driver
    pub fn add_user(&self, id: Uuid, name: &str, team_id: Option<Uuid>) {
        self.lock().users.insert(
            id,
            EventDriver {
                id,
                name: Some(name.to_string()),
                team_id,
            },
        );
    }

    /// Register a team; drivers join it through [`add_user`](Self::add_user)
    pub fn add_team(&self, id: Uuid, name: &str, manager_id: Uuid, social_media_id: Option<Uuid>) {
        self.lock().teams.insert(
            id,
            StoredTeam {
                name: name.to_string(),
                manager_id,
                social_media_id,
            },
        );
    }

    pub fn event_count(&self) -> usize {
        self.lock().events.len()
    }
}

#[async_trait]
impl EventStore for InMemoryEventStore {
    async fn find_events(&self, filter: &EventFilter) -> Result<Vec<Event>> {
        let state = self.lock();
        let mut events: Vec<Event> = state
            .events
            .values()
            .map(|stored| state.hydrate(stored))
            .filter(|event| filter.matches(event))
            .collect();
        events.sort_by_key(|e| (e.date, e.id));
        Ok(events)
    }

    async fn find_event(&self, id: Uuid) -> Result<Option<Event>> {
        let state = self.lock();
        Ok(state.events.get(&id).map(|stored| state.hydrate(stored)))
    }

    async fn create_event(&self, event: NewEvent) -> Result<Event> {
        let mut state = self.lock();
        state.check_users(&event.driver_ids)?;

        let now = Utc::now();
        let id = Uuid::new_v4();
        let driver_ids = unique(event.driver_ids);

        let stored = StoredEvent {
            event: Event {
                id,
                title: event.title,
                date: event.date,
                event_type: event.event_type,
                car: event.car,
                track: event.track,
                duration: event.duration,
                manager_id: event.manager_id,
                championship_id: event.championship_id,
                team_id: event.team_id,
                drivers: Vec::new(),
                championship: None,
                result: None,
                created_at: now,
                updated_at: now,
            },
            driver_ids,
        };

        let created = state.hydrate(&stored);
        state.events.insert(id, stored);
        Ok(created)
    }

    async fn update_event(&self, id: Uuid, patch: EventPatch) -> Result<Event> {
        let mut state = self.lock();
        if let Some(driver_ids) = &patch.driver_ids {
            state.check_users(driver_ids)?;
        }

        let stored = state.events.get_mut(&id).ok_or(RepositoryError::NotFound)?;
        patch.apply(&mut stored.event);
        if let Some(driver_ids) = patch.driver_ids {
            stored.driver_ids = unique(driver_ids);
        }

        let stored = stored.clone();
        Ok(state.hydrate(&stored))
    }

    async fn delete_event(&self, id: Uuid) -> Result<()> {
        let mut state = self.lock();
        state.events.remove(&id).ok_or(RepositoryError::NotFound)?;
        state.results.remove(&id);
        Ok(())
    }

    async fn find_team(&self, lookup: &TeamLookup) -> Result<Option<EventTeam>> {
        let state = self.lock();
        let team = state
            .teams
            .keys()
            .filter_map(|id| state.team(*id))
            .filter_map(|team| lookup.rank(&team).map(|rank| (rank, team)))
            .min_by_key(|(rank, team)| (*rank, team.id))
            .map(|(_, team)| team);
        Ok(team)
    }

    async fn upsert_result(
        &self,
        event_id: Uuid,
        result: ResultInput,
        recorded_by: Uuid,
    ) -> Result<EventResult> {
        let mut state = self.lock();
        if !state.events.contains_key(&event_id) {
            return Err(RepositoryError::NotFound.into());
        }

        let stored = EventResult {
            event_id,
            position: result.position,
            fastest_lap_ms: result.fastest_lap_ms,
            notes: result.notes,
            recorded_by,
            recorded_at: Utc::now(),
        };
        state.results.insert(event_id, stored.clone());
        Ok(stored)
    }

    async fn find_championship(&self, id: Uuid) -> Result<Option<Championship>> {
        Ok(self.lock().championships.get(&id).cloned())
    }

    async fn create_championship(&self, championship: NewChampionship) -> Result<Championship> {
        let created = Championship {
            id: Uuid::new_v4(),
            name: championship.name,
            organizer: championship.organizer,
            manager_id: championship.manager_id,
            created_at: Utc::now(),
        };
        self.lock()
            .championships
            .insert(created.id, created.clone());
        Ok(created)
    }

    async fn list_championships(&self) -> Result<Vec<Championship>> {
        let mut championships: Vec<Championship> =
            self.lock().championships.values().cloned().collect();
        championships.sort_by(|a, b| (&a.name, a.id).cmp(&(&b.name, b.id)));
        Ok(championships)
    }
}
