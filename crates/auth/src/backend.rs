//! Identity resolution backend
//!
//! `IdentityResolver` is the seam services and gateways depend on; the
//! production implementation validates platform-issued JWTs. Domain states
//! expose an `AuthBackend` via `FromRef` so the extractors can reach it:
//! ```ignore
//! impl FromRef<MyDomainState> for AuthBackend {
//!     fn from_ref(state: &MyDomainState) -> Self {
//!         state.auth.clone()
//!     }
//! }
//! ```

use std::sync::Arc;

use uuid::Uuid;

use crate::config::AuthConfig;
use crate::context::CallerIdentity;
use crate::error::AuthError;
use crate::types::CallerRole;

/// Resolves a presented credential into the acting caller.
#[async_trait::async_trait]
pub trait IdentityResolver: Send + Sync {
    /// Fails with an `AuthError` when the credential is invalid or expired.
    async fn resolve(&self, credential: &str) -> Result<CallerIdentity, AuthError>;
}

/// Resolver for HS256 access tokens carrying user, company and roles.
#[derive(Debug, Clone)]
pub struct JwtIdentityResolver {
    config: AuthConfig,
}

impl JwtIdentityResolver {
    pub fn new(config: AuthConfig) -> Self {
        Self { config }
    }
}

#[async_trait::async_trait]
impl IdentityResolver for JwtIdentityResolver {
    async fn resolve(&self, credential: &str) -> Result<CallerIdentity, AuthError> {
        let claims = crate::jwt::validate_jwt_token(credential, &self.config)?;

        let user_id = Uuid::parse_str(&claims.sub).map_err(|_| AuthError::InvalidUserId)?;

        let roles = claims
            .roles
            .iter()
            .filter_map(|raw| match raw.parse::<CallerRole>() {
                Ok(role) => Some(role),
                Err(e) => {
                    tracing::debug!(
                        user_id = %user_id,
                        error = %e,
                        "Ignoring unrecognised role claim"
                    );
                    None
                }
            })
            .collect();

        Ok(CallerIdentity::new(
            user_id,
            claims.email,
            claims.company_id,
            roles,
        ))
    }
}

/// Cloneable handle to the configured identity resolver.
#[derive(Clone)]
pub struct AuthBackend {
    resolver: Arc<dyn IdentityResolver>,
}

impl AuthBackend {
    pub fn new(resolver: Arc<dyn IdentityResolver>) -> Self {
        Self { resolver }
    }

    /// Backend validating JWTs with the given configuration
    pub fn jwt(config: AuthConfig) -> Self {
        Self::new(Arc::new(JwtIdentityResolver::new(config)))
    }

    pub(crate) async fn authenticate(&self, credential: &str) -> Result<CallerIdentity, AuthError> {
        self.resolver.resolve(credential).await
    }
}
