//! HTTP handlers for the Events domain

pub mod calendar;
pub mod championships;
pub mod events;
pub mod results;
