//! Store interfaces and adapters for the companies domain
//!
//! Services only see the traits below. Two adapters implement them:
//! Postgres (`sqlx`, every call wrapped in a `RetryPolicy`) and an
//! in-memory store with the same atomicity guarantees.

pub mod certificates;
pub mod invitations;
pub mod memory;
pub mod parties;
pub mod users;

use std::sync::Arc;

use partyhub_common::{RepositoryError, RetryPolicy};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::entities::{
    Certificate, CertificateId, CertificateSummary, CompanySettings, NewCertificate,
    NewInvitation, Party, PartyId, PlatformUser, UserInvitation,
};
use crate::domain::state::VerificationStatus;

pub use certificates::PgCertificateStore;
pub use invitations::PgInvitationStore;
pub use memory::MemoryStore;
pub use parties::PgPartyStore;
pub use users::PgUserStore;

pub type StoreResult<T> = std::result::Result<T, RepositoryError>;

/// Result of an atomic check-and-insert of a pending invitation
#[derive(Debug, Clone, PartialEq)]
pub enum InsertOutcome {
    Inserted(UserInvitation),
    /// A pending invitation for the same `(email, company_id)` already exists
    Duplicate,
}

/// Result of removing a certificate from its party
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetachOutcome {
    Removed,
    PartyNotFound,
    /// The party's list does not reference this certificate
    NotReferenced,
}

#[async_trait::async_trait]
pub trait PartyStore: Send + Sync {
    async fn get(&self, id: PartyId) -> StoreResult<Option<Party>>;

    /// Parties in the given status, ordered by id
    async fn list_by_verification_status(
        &self,
        status: VerificationStatus,
    ) -> StoreResult<Vec<Party>>;

    /// Insert or update a party. The certificate list is owned by
    /// `CertificateStore` and is only written on insert.
    async fn save(&self, party: &Party) -> StoreResult<Party>;

    /// Targeted status update; `None` when the party does not exist
    async fn set_verification_status(
        &self,
        id: PartyId,
        status: VerificationStatus,
    ) -> StoreResult<Option<Party>>;

    /// Targeted settings update; `None` when the party does not exist
    async fn update_settings(
        &self,
        id: PartyId,
        settings: &CompanySettings,
    ) -> StoreResult<Option<Party>>;
}

#[async_trait::async_trait]
pub trait CertificateStore: Send + Sync {
    async fn get(&self, id: CertificateId) -> StoreResult<Option<Certificate>>;

    /// Certificates in the order of the party's list
    async fn list_by_party(&self, party_id: PartyId) -> StoreResult<Vec<CertificateSummary>>;

    /// Create the certificate and append it to the party's list as one
    /// unit, serialized per party. `None` when the party does not exist.
    async fn attach(
        &self,
        party_id: PartyId,
        certificate: &NewCertificate,
    ) -> StoreResult<Option<Certificate>>;

    /// Drop the id from the party's list and delete the record as one
    /// unit, serialized per party.
    async fn detach(
        &self,
        party_id: PartyId,
        certificate_id: CertificateId,
    ) -> StoreResult<DetachOutcome>;

    /// Delete a record no party references; `false` when it does not exist.
    /// Fails with `InvalidData` while a party still lists the id.
    async fn delete(&self, id: CertificateId) -> StoreResult<bool>;
}

#[async_trait::async_trait]
pub trait InvitationStore: Send + Sync {
    /// Atomic check-and-insert on the pending `(email, company_id)` pair
    async fn insert_unique(&self, invitation: &NewInvitation) -> StoreResult<InsertOutcome>;

    /// All invitations for a company, oldest first
    async fn list_by_company(&self, company_id: PartyId) -> StoreResult<Vec<UserInvitation>>;

    async fn get_pending(
        &self,
        email: &str,
        company_id: PartyId,
    ) -> StoreResult<Option<UserInvitation>>;

    /// Mark the pending invitation consumed; `None` when none is pending
    async fn consume(&self, email: &str, company_id: PartyId)
        -> StoreResult<Option<UserInvitation>>;
}

#[async_trait::async_trait]
pub trait UserStore: Send + Sync {
    async fn get(&self, id: Uuid) -> StoreResult<Option<PlatformUser>>;
}

/// Combined store access for the companies domain
#[derive(Clone)]
pub struct CompaniesRepositories {
    pub parties: Arc<dyn PartyStore>,
    pub certificates: Arc<dyn CertificateStore>,
    pub invitations: Arc<dyn InvitationStore>,
    pub users: Arc<dyn UserStore>,
}

impl CompaniesRepositories {
    /// Postgres-backed stores sharing one pool and retry policy
    pub fn postgres(pool: PgPool, retry: RetryPolicy) -> Self {
        Self {
            parties: Arc::new(PgPartyStore::new(pool.clone(), retry.clone())),
            certificates: Arc::new(PgCertificateStore::new(pool.clone(), retry.clone())),
            invitations: Arc::new(PgInvitationStore::new(pool.clone(), retry.clone())),
            users: Arc::new(PgUserStore::new(pool, retry)),
        }
    }

    /// All stores backed by one shared in-memory store
    pub fn in_memory(store: Arc<MemoryStore>) -> Self {
        Self {
            parties: store.clone(),
            certificates: store.clone(),
            invitations: store.clone(),
            users: store,
        }
    }
}
