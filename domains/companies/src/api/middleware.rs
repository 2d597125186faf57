//! Companies domain state and auth backend integration

use axum::extract::FromRef;
use partyhub_auth::AuthBackend;

use crate::services::CompaniesServices;

pub use partyhub_auth::{AuthUser, PlatformManager};

/// Application state for the companies domain
#[derive(Clone)]
pub struct CompaniesState {
    pub services: CompaniesServices,
    pub auth: AuthBackend,
}

impl FromRef<CompaniesState> for AuthBackend {
    fn from_ref(state: &CompaniesState) -> Self {
        state.auth.clone()
    }
}
