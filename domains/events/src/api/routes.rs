//! Route definitions for Events domain API

use axum::{
    routing::{get, patch, post, put},
    Router,
};

use super::handlers::{calendar, championships, events, results};
use super::middleware::EventsState;

/// Calendar page routes (no authentication)
fn calendar_routes() -> Router<EventsState> {
    Router::new().route("/v1/calendar", get(calendar::get_calendar))
}

/// Role-scoped event views and event mutations
fn event_routes() -> Router<EventsState> {
    Router::new()
        .route("/v1/events", get(events::get_events))
        .route("/v1/events/driving", get(events::get_driving_events))
        .route("/v1/events/managing", get(events::get_managing_events))
        .route("/v1/events/team", get(events::get_team_events))
        .route(
            "/v1/events/championship",
            post(events::create_championship_event),
        )
        .route("/v1/events/one-off", post(events::create_one_off_event))
        .route(
            "/v1/events/{id}",
            patch(events::edit_event).delete(events::delete_event),
        )
        .route("/v1/events/{id}/result", put(results::record_result))
}

fn result_routes() -> Router<EventsState> {
    Router::new().route("/v1/results/team", get(results::get_team_results))
}

fn championship_routes() -> Router<EventsState> {
    Router::new().route(
        "/v1/championships",
        get(championships::list_championships).post(championships::create_championship),
    )
}

/// Create all Events domain API routes
pub fn routes() -> Router<EventsState> {
    Router::new()
        .merge(calendar_routes())
        .merge(event_routes())
        .merge(result_routes())
        .merge(championship_routes())
}
