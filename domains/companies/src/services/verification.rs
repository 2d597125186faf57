//! Admin verification gate
//!
//! Performs no authorization itself; the admin routes require the platform
//! manager role before any call reaches this service.

use std::sync::Arc;

use partyhub_common::{Error, Result};

use crate::domain::entities::{Party, PartyId};
use crate::domain::state::{VerificationEvent, VerificationStateMachine, VerificationStatus};
use crate::repository::PartyStore;

#[derive(Clone)]
pub struct VerificationService {
    parties: Arc<dyn PartyStore>,
}

impl VerificationService {
    pub fn new(parties: Arc<dyn PartyStore>) -> Self {
        Self { parties }
    }

    /// All unverified parties in store order; paging is left to the caller
    pub async fn list_unverified_companies(&self) -> Result<Vec<Party>> {
        let parties = self
            .parties
            .list_by_verification_status(VerificationStatus::Unverified)
            .await?;
        Ok(parties)
    }

    /// Mark a party verified. Verifying an already verified party succeeds
    /// without writing.
    pub async fn verify_company(&self, party_id: PartyId) -> Result<Party> {
        let party = self
            .parties
            .get(party_id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("Company {} not found", party_id)))?;

        let Some(next) = VerificationStateMachine::transition(
            party.verification_status,
            VerificationEvent::Verify,
        ) else {
            tracing::debug!(company_id = party_id, "Company already verified");
            return Ok(party);
        };

        let verified = self
            .parties
            .set_verification_status(party_id, next)
            .await?
            .ok_or_else(|| Error::NotFound(format!("Company {} not found", party_id)))?;

        tracing::info!(company_id = party_id, "Company verified");

        Ok(verified)
    }
}
