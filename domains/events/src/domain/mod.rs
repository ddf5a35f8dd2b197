//! Domain layer for events: calendar grid, entities, visibility scopes

pub mod calendar;
pub mod entities;
pub mod scope;
