//! Platform administration handlers: the company verification gate
//!
//! Both routes require the platform manager role via the `PlatformManager`
//! extractor, so unauthorized callers are rejected before any store access.

use axum::{
    extract::{Query, State},
    Json,
};
use chrono::{DateTime, Utc};
use partyhub_common::{Page, PageRequest, Result};
use serde::{Deserialize, Serialize};

use crate::api::middleware::{CompaniesState, PlatformManager};
use crate::domain::entities::{Party, PartyId};
use crate::domain::state::VerificationStatus;

/// Query parameters for verifying a company
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyCompanyQuery {
    pub company_id: PartyId,
}

/// Company as shown to platform managers
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyAdminResponse {
    pub id: PartyId,
    pub name: String,
    pub verification_status: VerificationStatus,
    pub vat_number: Option<String>,
    pub website: Option<String>,
    pub certificate_count: usize,
    pub created_at: DateTime<Utc>,
}

impl From<Party> for CompanyAdminResponse {
    fn from(party: Party) -> Self {
        Self {
            id: party.id,
            name: party.name,
            verification_status: party.verification_status,
            vat_number: party.vat_number,
            website: party.website,
            certificate_count: party.certificate_ids.len(),
            created_at: party.created_at,
        }
    }
}

/// List unverified companies
///
/// **GET /admin/unverified_companies?page=1&size=10**
pub async fn list_unverified_companies(
    PlatformManager(_admin): PlatformManager,
    State(state): State<CompaniesState>,
    Query(paging): Query<PageRequest>,
) -> Result<Json<Page<CompanyAdminResponse>>> {
    let unverified = state
        .services
        .verification
        .list_unverified_companies()
        .await?;

    Ok(Json(paging.slice(unverified).map(CompanyAdminResponse::from)))
}

/// Verify a company
///
/// **POST /admin/verify_company?companyId=42**
///
/// Idempotent: verifying an already verified company returns it unchanged.
pub async fn verify_company(
    PlatformManager(admin): PlatformManager,
    State(state): State<CompaniesState>,
    Query(query): Query<VerifyCompanyQuery>,
) -> Result<Json<CompanyAdminResponse>> {
    tracing::debug!(
        admin_id = %admin.user_id,
        company_id = query.company_id,
        "Verify company requested"
    );

    let party = state
        .services
        .verification
        .verify_company(query.company_id)
        .await?;

    Ok(Json(party.into()))
}
