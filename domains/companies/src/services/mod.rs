//! Services for the companies domain
//!
//! Constructed once at start-up from explicit store handles and shared by
//! every request handler.

pub mod certificates;
pub mod invitations;
pub mod settings;
pub mod verification;

use std::sync::Arc;
use std::time::Duration;

use partyhub_email::EmailService;

use crate::repository::CompaniesRepositories;

pub use certificates::{CertificateLifecycle, CertificateUpload};
pub use invitations::InvitationService;
pub use settings::CompanySettingsService;
pub use verification::VerificationService;

/// Tunables the services take from configuration
#[derive(Debug, Clone)]
pub struct ServiceLimits {
    pub max_certificate_bytes: usize,
    pub notify_timeout: Duration,
}

/// All companies-domain services wired to one set of stores
#[derive(Clone)]
pub struct CompaniesServices {
    pub verification: VerificationService,
    pub certificates: CertificateLifecycle,
    pub invitations: InvitationService,
    pub settings: CompanySettingsService,
}

impl CompaniesServices {
    pub fn new(
        repos: &CompaniesRepositories,
        email: Arc<dyn EmailService>,
        limits: ServiceLimits,
    ) -> Self {
        Self {
            verification: VerificationService::new(repos.parties.clone()),
            certificates: CertificateLifecycle::new(
                repos.parties.clone(),
                repos.certificates.clone(),
                limits.max_certificate_bytes,
            ),
            invitations: InvitationService::new(
                repos.invitations.clone(),
                repos.parties.clone(),
                repos.users.clone(),
                email,
                limits.notify_timeout,
            ),
            settings: CompanySettingsService::new(repos.parties.clone()),
        }
    }
}
