//! Event service
//!
//! Resolves the caller's scope and team, builds the event filter, and guards
//! mutations. All storage goes through an [`EventStore`].

use std::sync::Arc;

use chrono::{DateTime, Utc};
use pitwall_auth::roles::{has_role, resolve};
use pitwall_auth::{AuthContext, Role};
use pitwall_common::{Error, Result};
use uuid::Uuid;

use crate::domain::entities::{
    Championship, Event, EventPatch, EventResult, EventTeam, EventType, NewChampionship,
    NewEvent, ResultInput, ResultSort,
};
use crate::domain::scope::{DateRange, EventFilter, EventScope, EventView, TeamLookup};
use crate::repository::EventStore;

/// Event details supplied by a caller creating an event
#[derive(Debug, Clone, PartialEq)]
pub struct EventDraft {
    pub title: Option<String>,
    pub date: DateTime<Utc>,
    pub event_type: Option<EventType>,
    pub car: String,
    pub track: String,
    pub duration: i32,
    pub manager_id: Option<Uuid>,
    pub team_id: Option<Uuid>,
    /// Empty means the caller drives alone
    pub driver_ids: Vec<Uuid>,
}

/// Event changes supplied by a caller; see [`EventPatch`]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventEdit {
    pub title: Option<String>,
    pub date: Option<DateTime<Utc>>,
    pub event_type: Option<EventType>,
    pub car: Option<String>,
    pub track: Option<String>,
    pub duration: Option<i32>,
    pub driver_ids: Option<Vec<Uuid>>,
}

fn require_role(caller: &AuthContext, role: Role) -> Result<()> {
    if has_role(Some(caller), role) {
        Ok(())
    } else {
        Err(Error::Authorization(format!("The {role} role is required")))
    }
}

/// Drivers for a new event, falling back to the caller alone
fn drivers_or_caller(driver_ids: Vec<Uuid>, caller: &AuthContext) -> Vec<Uuid> {
    if driver_ids.is_empty() {
        vec![caller.user_id()]
    } else {
        driver_ids
    }
}

fn event_not_found() -> Error {
    Error::NotFound("Event not found".to_string())
}

#[derive(Clone)]
pub struct EventService {
    store: Arc<dyn EventStore>,
}

impl EventService {
    pub fn new(store: Arc<dyn EventStore>) -> Self {
        Self { store }
    }

    /// Events the caller drives in
    pub async fn driving_events(
        &self,
        caller: &AuthContext,
        range: DateRange,
    ) -> Result<Vec<Event>> {
        require_role(caller, Role::Driver)?;
        let scope = EventScope::Driving {
            driver_id: caller.user_id(),
        };
        self.store.find_events(&EventFilter::new(scope, range)).await
    }

    /// Events the caller manages
    pub async fn managing_events(
        &self,
        caller: &AuthContext,
        range: DateRange,
    ) -> Result<Vec<Event>> {
        require_role(caller, Role::Manager)?;
        let scope = EventScope::Managing {
            manager_id: caller.user_id(),
        };
        self.store.find_events(&EventFilter::new(scope, range)).await
    }

    /// Team feed: events of the caller's team minus the caller's own
    ///
    /// Empty when the caller has no team.
    pub async fn team_events(&self, caller: &AuthContext, range: DateRange) -> Result<Vec<Event>> {
        let Some(team) = self.caller_team(caller).await? else {
            return Ok(Vec::new());
        };

        let scope = EventScope::Team {
            team_id: team.id,
            viewer_id: Some(caller.user_id()),
        };
        self.store.find_events(&EventFilter::new(scope, range)).await
    }

    /// Team the caller belongs to, resolved from their roles
    pub async fn caller_team(&self, caller: &AuthContext) -> Result<Option<EventTeam>> {
        match TeamLookup::for_caller(caller.user_id(), &resolve(Some(caller))) {
            Some(lookup) => self.store.find_team(&lookup).await,
            None => Ok(None),
        }
    }

    /// Filter for the caller's default view, keyed on their primary role
    ///
    /// `None` when the caller has no role yet, or sees the team view but has
    /// no team.
    pub async fn build_filter(
        &self,
        caller: &AuthContext,
        first_day: chrono::NaiveDate,
        last_day: chrono::NaiveDate,
    ) -> Result<Option<EventFilter>> {
        let range = DateRange::new(first_day, last_day)?;
        let Some(view) = EventView::for_roles(&resolve(Some(caller))) else {
            return Ok(None);
        };

        let scope = match view {
            EventView::Driving => EventScope::Driving {
                driver_id: caller.user_id(),
            },
            EventView::Managing => EventScope::Managing {
                manager_id: caller.user_id(),
            },
            EventView::Team => match self.caller_team(caller).await? {
                Some(team) => EventScope::Team {
                    team_id: team.id,
                    viewer_id: Some(caller.user_id()),
                },
                None => return Ok(None),
            },
        };

        Ok(Some(EventFilter::new(scope, range)))
    }

    /// Check the team and manager a caller attaches to a new event
    ///
    /// The team must be the caller's own. The manager must be the caller or
    /// the manager of the caller's team.
    async fn check_links(
        &self,
        caller: &AuthContext,
        team_id: Option<Uuid>,
        manager_id: Option<Uuid>,
    ) -> Result<()> {
        if team_id.is_none() && manager_id.is_none_or(|id| id == caller.user_id()) {
            return Ok(());
        }

        let team = self.caller_team(caller).await?;

        if let Some(team_id) = team_id {
            if team.as_ref().map(|t| t.id) != Some(team_id) {
                tracing::warn!(
                    caller = %caller.user_id(),
                    team_id = %team_id,
                    "Rejected event for a foreign team"
                );
                return Err(Error::Authorization(
                    "Events can only be added to your own team".to_string(),
                ));
            }
        }

        if let Some(manager_id) = manager_id {
            let allowed = manager_id == caller.user_id()
                || team.as_ref().is_some_and(|t| t.manager_id == manager_id);
            if !allowed {
                return Err(Error::Authorization(
                    "The event manager must be you or your team's manager".to_string(),
                ));
            }
        }

        Ok(())
    }

    /// Events of the caller's default view
    pub async fn visible_events(
        &self,
        caller: &AuthContext,
        range: DateRange,
    ) -> Result<(Option<EventView>, Vec<Event>)> {
        match self
            .build_filter(caller, range.first_day(), range.last_day())
            .await?
        {
            Some(filter) => {
                let events = self.store.find_events(&filter).await?;
                Ok((Some(filter.scope().view()), events))
            }
            None => Ok((None, Vec::new())),
        }
    }

    /// Create a round of a championship
    ///
    /// The type defaults to championship. Without drivers the caller drives.
    /// A team or manager given must pass [`check_links`](Self::check_links).
    pub async fn create_championship_event(
        &self,
        caller: &AuthContext,
        championship_id: Uuid,
        draft: EventDraft,
    ) -> Result<Event> {
        if self.store.find_championship(championship_id).await?.is_none() {
            return Err(Error::NotFound("Championship not found".to_string()));
        }
        self.check_links(caller, draft.team_id, draft.manager_id).await?;

        let event = NewEvent {
            title: draft.title,
            date: draft.date,
            event_type: draft.event_type.unwrap_or(EventType::Championship),
            car: draft.car,
            track: draft.track,
            duration: draft.duration,
            manager_id: draft.manager_id,
            championship_id: Some(championship_id),
            team_id: draft.team_id,
            driver_ids: drivers_or_caller(draft.driver_ids, caller),
        };
        event.validate()?;

        let created = self.store.create_event(event).await?;
        tracing::info!(
            event_id = %created.id,
            championship_id = %championship_id,
            created_by = %caller.user_id(),
            "Championship event created"
        );
        Ok(created)
    }

    /// Create a one-off event
    ///
    /// Endurance events belong to the team the caller manages, and take a
    /// manager when one is given. Other types take neither.
    pub async fn create_one_off_event(
        &self,
        caller: &AuthContext,
        draft: EventDraft,
    ) -> Result<Event> {
        let event_type = draft.event_type.unwrap_or_default();

        let (team_id, manager_id) = if event_type == EventType::Endurance {
            let team = self
                .store
                .find_team(&TeamLookup::Manager {
                    user_id: caller.user_id(),
                })
                .await?;
            self.check_links(caller, None, draft.manager_id).await?;
            (team.map(|t| t.id), draft.manager_id)
        } else {
            (None, None)
        };

        let event = NewEvent {
            title: draft.title,
            date: draft.date,
            event_type,
            car: draft.car,
            track: draft.track,
            duration: draft.duration,
            manager_id,
            championship_id: None,
            team_id,
            driver_ids: drivers_or_caller(draft.driver_ids, caller),
        };
        event.validate()?;

        let created = self.store.create_event(event).await?;
        tracing::info!(
            event_id = %created.id,
            event_type = %created.event_type,
            team_id = ?created.team_id,
            created_by = %caller.user_id(),
            "One-off event created"
        );
        Ok(created)
    }

    /// Event the caller takes part in; anything else is reported as missing
    async fn participant_event(&self, caller: &AuthContext, id: Uuid) -> Result<Event> {
        match self.store.find_event(id).await? {
            Some(event) if event.is_participant(caller.user_id()) => Ok(event),
            _ => Err(event_not_found()),
        }
    }

    /// Partial update; an omitted type becomes sprint
    pub async fn edit_event(
        &self,
        caller: &AuthContext,
        id: Uuid,
        edit: EventEdit,
    ) -> Result<Event> {
        let patch = EventPatch {
            title: edit.title,
            date: edit.date,
            event_type: edit.event_type.unwrap_or_default(),
            car: edit.car,
            track: edit.track,
            duration: edit.duration,
            driver_ids: edit.driver_ids.map(|ids| drivers_or_caller(ids, caller)),
        };
        patch.validate()?;

        let previous = self.participant_event(caller, id).await?;
        if edit.event_type.is_none() && previous.event_type != EventType::Sprint {
            tracing::debug!(
                event_id = %id,
                previous = %previous.event_type,
                "Edit without type resets event to sprint"
            );
        }

        let updated = self.store.update_event(id, patch).await?;
        tracing::info!(event_id = %id, edited_by = %caller.user_id(), "Event updated");
        Ok(updated)
    }

    pub async fn delete_event(&self, caller: &AuthContext, id: Uuid) -> Result<()> {
        self.participant_event(caller, id).await?;
        self.store.delete_event(id).await?;
        tracing::info!(event_id = %id, deleted_by = %caller.user_id(), "Event deleted");
        Ok(())
    }

    /// Record or replace the result of an event the caller takes part in
    pub async fn record_result(
        &self,
        caller: &AuthContext,
        id: Uuid,
        input: ResultInput,
    ) -> Result<EventResult> {
        input.validate()?;
        self.participant_event(caller, id).await?;

        let result = self
            .store
            .upsert_result(id, input, caller.user_id())
            .await?;
        tracing::info!(
            event_id = %id,
            position = result.position,
            recorded_by = %caller.user_id(),
            "Result recorded"
        );
        Ok(result)
    }

    /// Results of the caller's team in the range
    ///
    /// Unlike the team feed, the caller's own events are included.
    pub async fn team_results(
        &self,
        caller: &AuthContext,
        range: DateRange,
        sort: ResultSort,
    ) -> Result<Vec<Event>> {
        let Some(team) = self.caller_team(caller).await? else {
            return Ok(Vec::new());
        };

        let scope = EventScope::Team {
            team_id: team.id,
            viewer_id: None,
        };
        let filter = EventFilter::new(scope, range).with_results_only();

        let mut events = self.store.find_events(&filter).await?;
        sort.apply(&mut events);
        Ok(events)
    }

    pub async fn create_championship(
        &self,
        caller: &AuthContext,
        name: &str,
        organizer: &str,
    ) -> Result<Championship> {
        require_role(caller, Role::Manager)?;

        let (name, organizer) = (name.trim(), organizer.trim());
        if name.is_empty() || organizer.is_empty() {
            return Err(Error::Validation(
                "Championship name and organizer are required".to_string(),
            ));
        }

        let created = self
            .store
            .create_championship(NewChampionship {
                name: name.to_string(),
                organizer: organizer.to_string(),
                manager_id: Some(caller.user_id()),
            })
            .await?;
        tracing::info!(championship_id = %created.id, "Championship created");
        Ok(created)
    }

    pub async fn list_championships(&self) -> Result<Vec<Championship>> {
        self.store.list_championships().await
    }
}
