//! Events domain: calendar pages, role-scoped event views, results

pub mod api;
pub mod domain;
pub mod repository;
pub mod service;

// Re-export domain types at the crate root for convenience
pub use domain::calendar::{build_page, CalendarMonth, CalendarPage};
pub use domain::entities::*;
pub use domain::scope::{DateRange, EventFilter, EventScope, EventView, TeamLookup};

// Re-export repository types
pub use repository::{EventStore, InMemoryEventStore, PgEventStore};

pub use service::{EventDraft, EventEdit, EventService};

// Re-export API types
pub use api::routes;
pub use api::EventsState;
