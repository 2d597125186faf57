//! Companies domain: verification, certificates, invitations, company settings

pub mod api;
pub mod domain;
pub mod repository;
pub mod services;

// Re-export domain types at the crate root for convenience
pub use domain::entities::*;
pub use domain::state::{
    InvitationEvent, InvitationState, InvitationStateMachine, VerificationEvent,
    VerificationStateMachine, VerificationStatus,
};

// Re-export repository types
pub use repository::{
    CertificateStore, CompaniesRepositories, DetachOutcome, InsertOutcome, InvitationStore,
    MemoryStore, PartyStore, UserStore,
};

// Re-export services
pub use services::{
    CertificateLifecycle, CertificateUpload, CompaniesServices, CompanySettingsService,
    InvitationService, ServiceLimits, VerificationService,
};

// Re-export API types
pub use api::routes;
pub use api::CompaniesState;
