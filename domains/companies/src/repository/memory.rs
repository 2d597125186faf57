//! In-memory store backing every companies-domain store trait
//!
//! One mutex guards all tables, so each trait call is atomic with respect to
//! every other call: the same guarantees the Postgres adapter gets from row
//! locks and the partial unique index. Used for `STORE_BACKEND=memory` and tests.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard};

use chrono::Utc;
use partyhub_common::RepositoryError;
use uuid::Uuid;

use super::{
    CertificateStore, DetachOutcome, InsertOutcome, InvitationStore, PartyStore, StoreResult,
    UserStore,
};
use crate::domain::entities::{
    Certificate, CertificateId, CertificateSummary, CompanySettings, NewCertificate,
    NewInvitation, Party, PartyId, PlatformUser, UserInvitation,
};
use crate::domain::state::VerificationStatus;

#[derive(Default)]
struct Tables {
    parties: BTreeMap<PartyId, Party>,
    certificates: HashMap<CertificateId, Certificate>,
    upload_keys: HashMap<Uuid, CertificateId>,
    last_certificate_id: CertificateId,
    invitations: Vec<UserInvitation>,
    users: HashMap<Uuid, PlatformUser>,
}

#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
    unavailable: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// While set, every call fails with `RepositoryError::Unavailable`
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Seed a party record as-is
    pub fn insert_party(&self, party: Party) {
        self.lock_tables().parties.insert(party.id, party);
    }

    /// Seed a platform user
    pub fn insert_user(&self, user: PlatformUser) {
        self.lock_tables().users.insert(user.id, user);
    }

    pub fn certificate_count(&self) -> usize {
        self.lock_tables().certificates.len()
    }

    pub fn invitation_count(&self) -> usize {
        self.lock_tables().invitations.len()
    }

    fn lock_tables(&self) -> MutexGuard<'_, Tables> {
        self.tables
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn tables(&self) -> StoreResult<MutexGuard<'_, Tables>> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(RepositoryError::Unavailable(
                "in-memory store marked unavailable".to_string(),
            ));
        }
        Ok(self.lock_tables())
    }
}

#[async_trait::async_trait]
impl PartyStore for MemoryStore {
    async fn get(&self, id: PartyId) -> StoreResult<Option<Party>> {
        Ok(self.tables()?.parties.get(&id).cloned())
    }

    async fn list_by_verification_status(
        &self,
        status: VerificationStatus,
    ) -> StoreResult<Vec<Party>> {
        Ok(self
            .tables()?
            .parties
            .values()
            .filter(|p| p.verification_status == status)
            .cloned()
            .collect())
    }

    async fn save(&self, party: &Party) -> StoreResult<Party> {
        let mut tables = self.tables()?;
        if let Some(existing) = tables.parties.get_mut(&party.id) {
            existing.name = party.name.clone();
            existing.verification_status =
                existing.verification_status.max(party.verification_status);
            existing.preferred_categories = party.preferred_categories.clone();
            existing.website = party.website.clone();
            existing.vat_number = party.vat_number.clone();
            existing.ppap_compatibility_level = party.ppap_compatibility_level;
            existing.updated_at = Utc::now();
            return Ok(existing.clone());
        }

        tables.parties.insert(party.id, party.clone());
        Ok(party.clone())
    }

    async fn set_verification_status(
        &self,
        id: PartyId,
        status: VerificationStatus,
    ) -> StoreResult<Option<Party>> {
        let mut tables = self.tables()?;
        Ok(tables.parties.get_mut(&id).map(|party| {
            party.verification_status = status;
            party.updated_at = Utc::now();
            party.clone()
        }))
    }

    async fn update_settings(
        &self,
        id: PartyId,
        settings: &CompanySettings,
    ) -> StoreResult<Option<Party>> {
        let mut tables = self.tables()?;
        Ok(tables.parties.get_mut(&id).map(|party| {
            settings.apply_to(party);
            party.clone()
        }))
    }
}

#[async_trait::async_trait]
impl CertificateStore for MemoryStore {
    async fn get(&self, id: CertificateId) -> StoreResult<Option<Certificate>> {
        Ok(self.tables()?.certificates.get(&id).cloned())
    }

    async fn list_by_party(&self, party_id: PartyId) -> StoreResult<Vec<CertificateSummary>> {
        let tables = self.tables()?;
        let Some(party) = tables.parties.get(&party_id) else {
            return Ok(Vec::new());
        };

        Ok(party
            .certificate_ids
            .iter()
            .filter_map(|id| tables.certificates.get(id))
            .map(Certificate::summary)
            .collect())
    }

    async fn attach(
        &self,
        party_id: PartyId,
        certificate: &NewCertificate,
    ) -> StoreResult<Option<Certificate>> {
        let mut tables = self.tables()?;
        if !tables.parties.contains_key(&party_id) {
            return Ok(None);
        }

        let replayed = tables
            .upload_keys
            .get(&certificate.upload_key)
            .and_then(|id| tables.certificates.get(id));
        if let Some(existing) = replayed {
            return Ok(Some(existing.clone()));
        }

        tables.last_certificate_id += 1;
        let id = tables.last_certificate_id;
        let created = certificate.clone().into_certificate(id, party_id);
        tables.certificates.insert(id, created.clone());
        tables.upload_keys.insert(certificate.upload_key, id);

        if let Some(party) = tables.parties.get_mut(&party_id) {
            party.certificate_ids.push(id);
            party.updated_at = Utc::now();
        }

        Ok(Some(created))
    }

    async fn detach(
        &self,
        party_id: PartyId,
        certificate_id: CertificateId,
    ) -> StoreResult<DetachOutcome> {
        let mut tables = self.tables()?;
        let Some(party) = tables.parties.get_mut(&party_id) else {
            return Ok(DetachOutcome::PartyNotFound);
        };

        if !party.owns_certificate(certificate_id) {
            return Ok(DetachOutcome::NotReferenced);
        }

        party.certificate_ids.retain(|id| *id != certificate_id);
        party.updated_at = Utc::now();
        tables.certificates.remove(&certificate_id);
        tables.upload_keys.retain(|_, id| *id != certificate_id);

        Ok(DetachOutcome::Removed)
    }

    async fn delete(&self, id: CertificateId) -> StoreResult<bool> {
        let mut tables = self.tables()?;
        if tables.parties.values().any(|p| p.owns_certificate(id)) {
            return Err(RepositoryError::InvalidData(format!(
                "certificate {} is still listed by its party",
                id
            )));
        }
        Ok(tables.certificates.remove(&id).is_some())
    }
}

#[async_trait::async_trait]
impl InvitationStore for MemoryStore {
    async fn insert_unique(&self, invitation: &NewInvitation) -> StoreResult<InsertOutcome> {
        let mut tables = self.tables()?;
        let duplicate = tables.invitations.iter().any(|existing| {
            existing.is_pending()
                && existing.email == invitation.email
                && existing.company_id == invitation.company_id
        });

        if duplicate {
            return Ok(InsertOutcome::Duplicate);
        }

        let created = invitation.clone().into_invitation();
        tables.invitations.push(created.clone());
        Ok(InsertOutcome::Inserted(created))
    }

    async fn list_by_company(&self, company_id: PartyId) -> StoreResult<Vec<UserInvitation>> {
        Ok(self
            .tables()?
            .invitations
            .iter()
            .filter(|i| i.company_id == company_id)
            .cloned()
            .collect())
    }

    async fn get_pending(
        &self,
        email: &str,
        company_id: PartyId,
    ) -> StoreResult<Option<UserInvitation>> {
        Ok(self
            .tables()?
            .invitations
            .iter()
            .find(|i| i.is_pending() && i.email == email && i.company_id == company_id)
            .cloned())
    }

    async fn consume(
        &self,
        email: &str,
        company_id: PartyId,
    ) -> StoreResult<Option<UserInvitation>> {
        let mut tables = self.tables()?;
        let Some(invitation) = tables
            .invitations
            .iter_mut()
            .find(|i| i.is_pending() && i.email == email && i.company_id == company_id)
        else {
            return Ok(None);
        };

        invitation
            .consume()
            .map_err(|e| RepositoryError::InvalidData(e.to_string()))?;
        Ok(Some(invitation.clone()))
    }
}

#[async_trait::async_trait]
impl UserStore for MemoryStore {
    async fn get(&self, id: Uuid) -> StoreResult<Option<PlatformUser>> {
        Ok(self.tables()?.users.get(&id).cloned())
    }
}
