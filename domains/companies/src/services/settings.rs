//! Company settings: public profile fields of a party

use std::sync::Arc;

use partyhub_auth::CallerIdentity;
use partyhub_common::{Error, Result};
use validator::Validate;

use crate::domain::entities::{CompanySettings, Party, PartyId};
use crate::repository::PartyStore;

#[derive(Clone)]
pub struct CompanySettingsService {
    parties: Arc<dyn PartyStore>,
}

impl CompanySettingsService {
    pub fn new(parties: Arc<dyn PartyStore>) -> Self {
        Self { parties }
    }

    pub async fn get_settings(&self, company_id: PartyId) -> Result<Party> {
        self.parties
            .get(company_id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("Company {} not found", company_id)))
    }

    /// Replace the editable fields; certificates and verification are untouched
    pub async fn update_settings(
        &self,
        caller: &CallerIdentity,
        company_id: PartyId,
        settings: CompanySettings,
    ) -> Result<Party> {
        if !caller.belongs_to(company_id) {
            return Err(Error::Authorization(
                "Access denied: Not a member of this company".to_string(),
            ));
        }

        settings
            .validate()
            .map_err(|e| Error::Validation(format!("Validation failed: {}", e)))?;

        let updated = self
            .parties
            .update_settings(company_id, &settings)
            .await?
            .ok_or_else(|| Error::NotFound(format!("Company {} not found", company_id)))?;

        tracing::info!(company_id, "Company settings updated");

        Ok(updated)
    }
}
