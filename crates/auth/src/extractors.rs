//! Axum extractors for authentication
//!
//! Generic over any state `S` where `AuthBackend: FromRef<S>`.
//! This is axum's idiomatic nested-state pattern.

use axum::{
    extract::{FromRef, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts},
};

use crate::backend::AuthBackend;
use crate::context::AuthContext;
use crate::error::AuthError;
use crate::jwt::extract_bearer_token;
use crate::roles::Role;

/// Authenticated user extractor, any role (or none yet)
#[derive(Debug)]
pub struct AuthUser(pub AuthContext);

impl<S> FromRequestParts<S> for AuthUser
where
    AuthBackend: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &S,
    ) -> std::result::Result<Self, Self::Rejection> {
        let backend = AuthBackend::from_ref(state);

        let auth_header = parts
            .headers
            .get(AUTHORIZATION)
            .ok_or(AuthError::MissingAuthorization)?;

        let token = extract_bearer_token(auth_header)?;
        let auth_context = backend.authenticate_jwt(&token).await?;

        Ok(AuthUser(auth_context))
    }
}

async fn authenticate_with_role<S>(
    parts: &mut Parts,
    state: &S,
    role: Role,
) -> Result<AuthContext, AuthError>
where
    AuthBackend: FromRef<S>,
    S: Send + Sync,
{
    let AuthUser(auth_context) = AuthUser::from_request_parts(parts, state).await?;
    auth_context.require_role(role)?;
    Ok(auth_context)
}

/// Authenticated user holding the driver role; 403 otherwise
#[derive(Debug)]
pub struct DriverUser(pub AuthContext);

impl<S> FromRequestParts<S> for DriverUser
where
    AuthBackend: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &S,
    ) -> std::result::Result<Self, Self::Rejection> {
        authenticate_with_role(parts, state, Role::Driver)
            .await
            .map(DriverUser)
    }
}

/// Authenticated user holding the manager role; 403 otherwise
#[derive(Debug)]
pub struct ManagerUser(pub AuthContext);

impl<S> FromRequestParts<S> for ManagerUser
where
    AuthBackend: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &S,
    ) -> std::result::Result<Self, Self::Rejection> {
        authenticate_with_role(parts, state, Role::Manager)
            .await
            .map(ManagerUser)
    }
}
