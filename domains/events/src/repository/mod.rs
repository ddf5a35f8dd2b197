//! Event storage
//!
//! [`EventStore`] is the seam between the event service and the database.
//! [`PgEventStore`] is the production implementation; [`InMemoryEventStore`]
//! evaluates the same filters in memory for tests and local tooling.

pub mod events;
pub mod memory;

use async_trait::async_trait;
use pitwall_common::Result;
use uuid::Uuid;

use crate::domain::entities::{
    Championship, Event, EventPatch, EventResult, EventTeam, NewChampionship, NewEvent,
    ResultInput,
};
use crate::domain::scope::{EventFilter, TeamLookup};

pub use events::PgEventStore;
pub use memory::InMemoryEventStore;

#[async_trait]
pub trait EventStore: Send + Sync {
    /// Events matching the filter, oldest first, with drivers, championship and result
    async fn find_events(&self, filter: &EventFilter) -> Result<Vec<Event>>;

    async fn find_event(&self, id: Uuid) -> Result<Option<Event>>;

    async fn create_event(&self, event: NewEvent) -> Result<Event>;

    /// Apply a patch; a missing event is `NotFound`
    async fn update_event(&self, id: Uuid, patch: EventPatch) -> Result<Event>;

    async fn delete_event(&self, id: Uuid) -> Result<()>;

    /// Best matching team for the lookup
    async fn find_team(&self, lookup: &TeamLookup) -> Result<Option<EventTeam>>;

    /// Insert or replace the result of an event
    async fn upsert_result(
        &self,
        event_id: Uuid,
        result: ResultInput,
        recorded_by: Uuid,
    ) -> Result<EventResult>;

    async fn find_championship(&self, id: Uuid) -> Result<Option<Championship>>;

    async fn create_championship(&self, championship: NewChampionship) -> Result<Championship>;

    async fn list_championships(&self) -> Result<Vec<Championship>>;
}
