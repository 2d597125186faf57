//! Axum extractors for authentication
//!
//! Generic over any state `S` where `AuthBackend: FromRef<S>`.
//! This is axum's idiomatic nested-state pattern.

use axum::{
    extract::{FromRef, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts},
};

use crate::backend::AuthBackend;
use crate::context::CallerIdentity;
use crate::error::AuthError;
use crate::jwt::extract_bearer_token;

/// Authenticated caller extractor (bearer token)
#[derive(Debug)]
pub struct AuthUser(pub CallerIdentity);

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
        let caller = backend.authenticate(token).await?;

        Ok(AuthUser(caller))
    }
}

/// Platform-manager extractor.
///
/// Like `AuthUser` but rejects callers without the platform manager role
/// with 403 FORBIDDEN, before the handler body runs.
#[derive(Debug)]
pub struct PlatformManager(pub CallerIdentity);

impl<S> FromRequestParts<S> for PlatformManager
where
    AuthBackend: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &S,
    ) -> std::result::Result<Self, Self::Rejection> {
        let AuthUser(caller) = AuthUser::from_request_parts(parts, state).await?;

        if !caller.is_platform_manager() {
            tracing::info!(user_id = %caller.user_id, "Rejected non-admin caller on admin route");
            return Err(AuthError::InsufficientRole);
        }

        Ok(PlatformManager(caller))
    }
}
