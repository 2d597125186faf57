//! Domain entities for the Partyhub companies domain
//!
//! Parties own their certificates: `Party::certificate_ids` is the single
//! source of truth for which certificates a company holds, while
//! `Certificate::party_id` is a back-reference used for authorization only.

use chrono::{DateTime, Utc};
use partyhub_common::{Error, Result};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::domain::state::{
    InvitationEvent, InvitationState, InvitationStateMachine, VerificationStatus,
};
use crate::domain::validation::{
    is_valid_email, is_valid_mime_type, normalize_email, sanitize_file_name,
};

pub type PartyId = i64;
pub type CertificateId = i64;

/// Company record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Party {
    pub id: PartyId,
    pub name: String,
    pub verification_status: VerificationStatus,
    /// Ordered ids of the certificates this company owns
    pub certificate_ids: Vec<CertificateId>,
    pub preferred_categories: Vec<String>,
    pub website: Option<String>,
    pub vat_number: Option<String>,
    pub ppap_compatibility_level: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Party {
    /// Freshly registered, unverified company without certificates
    pub fn new(id: PartyId, name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(Error::Validation("Company name must not be empty".to_string()));
        }

        let now = Utc::now();
        Ok(Self {
            id,
            name,
            verification_status: VerificationStatus::Unverified,
            certificate_ids: Vec::new(),
            preferred_categories: Vec::new(),
            website: None,
            vat_number: None,
            ppap_compatibility_level: None,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn is_verified(&self) -> bool {
        self.verification_status == VerificationStatus::Verified
    }

    pub fn owns_certificate(&self, certificate_id: CertificateId) -> bool {
        self.certificate_ids.contains(&certificate_id)
    }
}

/// Editable company settings; never touches verification or certificates
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CompanySettings {
    #[validate(length(min = 1, max = 255))]
    pub name: String,

    #[validate(url)]
    pub website: Option<String>,

    #[validate(length(max = 64))]
    pub vat_number: Option<String>,

    #[serde(default)]
    #[validate(length(max = 100))]
    pub preferred_categories: Vec<String>,

    #[validate(range(min = 1, max = 10))]
    pub ppap_compatibility_level: Option<i32>,
}

impl CompanySettings {
    /// Apply to an in-memory party record
    pub fn apply_to(&self, party: &mut Party) {
        party.name = self.name.clone();
        party.website = self.website.clone();
        party.vat_number = self.vat_number.clone();
        party.preferred_categories = self.preferred_categories.clone();
        party.ppap_compatibility_level = self.ppap_compatibility_level;
        party.updated_at = Utc::now();
    }
}

impl From<&Party> for CompanySettings {
    fn from(party: &Party) -> Self {
        Self {
            name: party.name.clone(),
            website: party.website.clone(),
            vat_number: party.vat_number.clone(),
            preferred_categories: party.preferred_categories.clone(),
            ppap_compatibility_level: party.ppap_compatibility_level,
        }
    }
}

/// Binary payload of a certificate, stored exactly as uploaded
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct CertificateDocument {
    pub mime_type: String,
    pub file_name: String,
    pub content: Vec<u8>,
}

/// Certificate record; content is immutable once created
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct Certificate {
    pub id: CertificateId,
    pub party_id: PartyId,
    pub name: String,
    pub certificate_type: String,
    #[sqlx(flatten)]
    pub document: CertificateDocument,
    pub created_at: DateTime<Utc>,
}

impl Certificate {
    pub fn summary(&self) -> CertificateSummary {
        CertificateSummary {
            id: self.id,
            party_id: self.party_id,
            name: self.name.clone(),
            certificate_type: self.certificate_type.clone(),
            mime_type: self.document.mime_type.clone(),
            file_name: self.document.file_name.clone(),
            size_bytes: self.document.content.len() as i64,
            created_at: self.created_at,
        }
    }
}

/// Certificate metadata without the payload, for listings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct CertificateSummary {
    pub id: CertificateId,
    pub party_id: PartyId,
    pub name: String,
    #[serde(rename = "type")]
    pub certificate_type: String,
    pub mime_type: String,
    pub file_name: String,
    pub size_bytes: i64,
    pub created_at: DateTime<Utc>,
}

/// Validated certificate upload, not yet owned by a party
#[derive(Debug, Clone, PartialEq)]
pub struct NewCertificate {
    /// Stable per upload; a store seeing the same key again returns the
    /// certificate it already created instead of a second one
    pub upload_key: Uuid,
    pub name: String,
    pub certificate_type: String,
    pub document: CertificateDocument,
}

impl NewCertificate {
    pub fn new(
        name: &str,
        certificate_type: &str,
        mime_type: &str,
        file_name: &str,
        content: Vec<u8>,
        max_bytes: usize,
    ) -> Result<Self> {
        if content.is_empty() {
            return Err(Error::Validation(
                "Certificate file must not be empty".to_string(),
            ));
        }

        if content.len() > max_bytes {
            return Err(Error::Validation(format!(
                "Certificate file exceeds the maximum size of {} bytes",
                max_bytes
            )));
        }

        let name = name.trim();
        if name.is_empty() || name.len() > 255 {
            return Err(Error::Validation(
                "Certificate name must be 1-255 characters".to_string(),
            ));
        }

        let certificate_type = certificate_type.trim();
        if certificate_type.is_empty() || certificate_type.len() > 100 {
            return Err(Error::Validation(
                "Certificate type must be 1-100 characters".to_string(),
            ));
        }

        let mime_type = mime_type.trim();
        if !is_valid_mime_type(mime_type) {
            return Err(Error::Validation(format!(
                "Invalid content type: {}",
                mime_type
            )));
        }

        let file_name = sanitize_file_name(file_name)
            .ok_or_else(|| Error::Validation("Invalid file name".to_string()))?;

        Ok(Self {
            upload_key: Uuid::new_v4(),
            name: name.to_string(),
            certificate_type: certificate_type.to_string(),
            document: CertificateDocument {
                mime_type: mime_type.to_string(),
                file_name,
                content,
            },
        })
    }

    /// Materialize with a store-assigned id
    pub fn into_certificate(self, id: CertificateId, party_id: PartyId) -> Certificate {
        Certificate {
            id,
            party_id,
            name: self.name,
            certificate_type: self.certificate_type,
            document: self.document,
            created_at: Utc::now(),
        }
    }
}

/// Invitation of an email address into a company
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct UserInvitation {
    pub id: Uuid,
    pub email: String,
    pub company_id: PartyId,
    pub invited_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub consumed_at: Option<DateTime<Utc>>,
}

impl UserInvitation {
    /// Get the derived invitation state
    pub fn state(&self) -> InvitationState {
        if self.consumed_at.is_some() {
            InvitationState::Consumed
        } else {
            InvitationState::Pending
        }
    }

    pub fn is_pending(&self) -> bool {
        self.state() == InvitationState::Pending
    }

    /// Mark consumed; fails if the invitation was already consumed
    pub fn consume(&mut self) -> Result<()> {
        InvitationStateMachine::transition(self.state(), InvitationEvent::Consume)
            .map_err(|e| Error::Conflict(e.to_string()))?;
        self.consumed_at = Some(Utc::now());
        Ok(())
    }
}

/// Invitation about to be inserted; its `(email, company_id)` must be unique among pending ones
#[derive(Debug, Clone, PartialEq)]
pub struct NewInvitation {
    pub email: String,
    pub company_id: PartyId,
    pub invited_by: Uuid,
    pub created_at: DateTime<Utc>,
}

impl NewInvitation {
    /// Normalizes and validates the recipient address
    pub fn new(email: &str, company_id: PartyId, invited_by: Uuid) -> Result<Self> {
        let email = normalize_email(email);
        if !is_valid_email(&email) {
            return Err(Error::Validation("Invalid email format".to_string()));
        }

        Ok(Self {
            email,
            company_id,
            invited_by,
            created_at: Utc::now(),
        })
    }

    pub fn into_invitation(self) -> UserInvitation {
        UserInvitation {
            id: Uuid::new_v4(),
            email: self.email,
            company_id: self.company_id,
            invited_by: self.invited_by,
            created_at: self.created_at,
            consumed_at: None,
        }
    }
}

/// Registered platform user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct PlatformUser {
    pub id: Uuid,
    pub email: String,
    pub first_name: String,
    pub family_name: String,
    pub company_id: Option<PartyId>,
}

impl PlatformUser {
    /// Name shown in invitation emails; falls back to the email address
    pub fn display_name(&self) -> String {
        let name = format!("{} {}", self.first_name.trim(), self.family_name.trim());
        let name = name.trim();
        if name.is_empty() {
            self.email.clone()
        } else {
            name.to_string()
        }
    }
}
