//! Company settings handlers

use axum::{
    extract::{Path, State},
    Json,
};
use chrono::{DateTime, Utc};
use partyhub_common::{Result, ValidatedJson};
use serde::Serialize;

use crate::api::middleware::{AuthUser, CompaniesState};
use crate::domain::entities::{CertificateId, CompanySettings, Party, PartyId};
use crate::domain::state::VerificationStatus;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanySettingsResponse {
    pub id: PartyId,
    #[serde(flatten)]
    pub settings: CompanySettings,
    pub verification_status: VerificationStatus,
    pub certificate_ids: Vec<CertificateId>,
    pub updated_at: DateTime<Utc>,
}

impl From<Party> for CompanySettingsResponse {
    fn from(party: Party) -> Self {
        Self {
            id: party.id,
            settings: CompanySettings::from(&party),
            verification_status: party.verification_status,
            certificate_ids: party.certificate_ids,
            updated_at: party.updated_at,
        }
    }
}

/// Get a company's settings
///
/// **GET /company-settings/{company_id}**
pub async fn get_settings(
    AuthUser(_caller): AuthUser,
    State(state): State<CompaniesState>,
    Path(company_id): Path<PartyId>,
) -> Result<Json<CompanySettingsResponse>> {
    let party = state.services.settings.get_settings(company_id).await?;
    Ok(Json(party.into()))
}

/// Update a company's settings
///
/// **PUT /company-settings/{company_id}**
pub async fn update_settings(
    AuthUser(caller): AuthUser,
    State(state): State<CompaniesState>,
    Path(company_id): Path<PartyId>,
    ValidatedJson(settings): ValidatedJson<CompanySettings>,
) -> Result<Json<CompanySettingsResponse>> {
    let party = state
        .services
        .settings
        .update_settings(&caller, company_id, settings)
        .await?;

    Ok(Json(party.into()))
}
