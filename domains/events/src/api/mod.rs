//! API layer for the Events domain
//!
//! Contains HTTP handlers, routes, and domain state definition.

pub mod handlers;
pub mod middleware;
pub mod query;
pub mod routes;

pub use middleware::EventsState;
pub use routes::routes;
