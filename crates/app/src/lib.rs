//! Pitwall application composition root
//!
//! Composes all domain routers into a single application.

use std::sync::Arc;

use axum::http::{header, HeaderValue, Method};
use axum::Router;
use pitwall_auth::{AuthBackend, AuthConfig};
use pitwall_common::Config;
use pitwall_events::{EventService, EventsState, PgEventStore};
use pitwall_teams::{TeamsRepositories, TeamsState};
use sqlx::PgPool;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;

/// Largest accepted request body
const MAX_BODY_BYTES: usize = 256 * 1024;

/// Create the main application router with all routes
pub fn create_app(config: &Config, pool: PgPool) -> Router {
    let auth = AuthBackend::new(pool.clone(), AuthConfig::from(config));

    let teams_state = TeamsState {
        repos: TeamsRepositories::new(pool.clone()),
        auth: auth.clone(),
    };

    let events_state = EventsState {
        service: EventService::new(Arc::new(PgEventStore::new(pool))),
        auth,
        week_start: config.calendar_week_start,
    };

    Router::new()
        .route("/health", axum::routing::get(health_check))
        .route(
            "/",
            axum::routing::get(|| async { concat!("Pitwall API v", env!("CARGO_PKG_VERSION")) }),
        )
        .merge(pitwall_teams::routes().with_state(teams_state))
        .merge(pitwall_events::routes().with_state(events_state))
}

/// CORS for a comma-separated origin list; `*` allows any origin
pub fn build_cors_layer(allowed_origins: &str) -> CorsLayer {
    let base = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]);

    if allowed_origins.trim() == "*" {
        return base.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = allowed_origins
        .split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    base.allow_origin(origins)
}

pub fn body_limit_layer() -> RequestBodyLimitLayer {
    RequestBodyLimitLayer::new(MAX_BODY_BYTES)
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}
