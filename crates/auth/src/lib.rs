//! Caller identity resolution for Partyhub
//!
//! Provides the `IdentityResolver` seam, a JWT-backed implementation, and
//! axum extractors that work with any domain state implementing
//! `FromRef<S>` for `AuthBackend`.

mod backend;
mod claims;
mod config;
mod context;
mod error;
mod extractors;
mod jwt;
mod types;

pub use backend::{AuthBackend, IdentityResolver, JwtIdentityResolver};
pub use claims::AccessClaims;
pub use config::AuthConfig;
pub use context::CallerIdentity;
pub use error::AuthError;
pub use extractors::{AuthUser, PlatformManager};
pub use types::CallerRole;
