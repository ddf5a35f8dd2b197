//! Authentication and role resolution for the Pitwall API
//!
//! Provides JWT validation, the principal's role set, and axum extractors
//! that work with any domain state implementing `FromRef<S>` for `AuthBackend`.

mod backend;
mod claims;
mod config;
mod context;
mod error;
mod extractors;
mod jwt;
pub mod roles;
mod types;

pub use backend::AuthBackend;
pub use claims::IdentityClaims;
pub use config::AuthConfig;
pub use context::AuthContext;
pub use error::AuthError;
pub use extractors::{AuthUser, DriverUser, ManagerUser};
pub use roles::{Role, RoleSet, UnknownRole};
pub use types::AuthIdentity;
