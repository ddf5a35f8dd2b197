//! Events domain state and auth backend integration

use axum::extract::FromRef;
use chrono::Weekday;
use pitwall_auth::AuthBackend;

use crate::service::EventService;

/// Application state for the Events domain
#[derive(Clone)]
pub struct EventsState {
    pub service: EventService,
    pub auth: AuthBackend,
    /// First column of calendar pages
    pub week_start: Weekday,
}

impl FromRef<EventsState> for AuthBackend {
    fn from_ref(state: &EventsState) -> Self {
        state.auth.clone()
    }
}
