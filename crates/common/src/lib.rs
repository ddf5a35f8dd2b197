//! Shared utilities, configuration, and error handling for Pitwall
//!
//! This crate provides common functionality used across the Pitwall services:
//! - Configuration management following 12-factor principles
//! - Error types and their HTTP mapping
//! - Request extractors shared by the domain routers

pub mod config;
pub mod db;
pub mod error;
pub mod extractors;

pub use config::Config;
pub use db::RepositoryError;
pub use error::{Error, Result};
pub use extractors::{SearchQuery, ValidatedJson};
