//! Certificate lifecycle: attach, download, remove, list
//!
//! A certificate moves `Absent -> Attached -> Removed`. Ids are never
//! reused, so a removed certificate cannot be attached again.

use std::sync::Arc;

use partyhub_auth::CallerIdentity;
use partyhub_common::{Error, Result};

use crate::domain::entities::{
    Certificate, CertificateDocument, CertificateId, CertificateSummary, NewCertificate, PartyId,
};
use crate::repository::{CertificateStore, DetachOutcome, PartyStore};

/// Raw upload as received from the caller
#[derive(Debug, Clone)]
pub struct CertificateUpload {
    pub name: String,
    pub certificate_type: String,
    pub mime_type: String,
    pub file_name: String,
    pub content: Vec<u8>,
}

#[derive(Clone)]
pub struct CertificateLifecycle {
    parties: Arc<dyn PartyStore>,
    certificates: Arc<dyn CertificateStore>,
    max_certificate_bytes: usize,
}

fn ensure_member(caller: &CallerIdentity, company_id: PartyId) -> Result<()> {
    if caller.belongs_to(company_id) {
        return Ok(());
    }

    tracing::info!(
        user_id = %caller.user_id,
        company_id,
        "Rejected certificate change for foreign company"
    );
    Err(Error::Authorization(
        "Access denied: Not a member of this company".to_string(),
    ))
}

impl CertificateLifecycle {
    pub fn new(
        parties: Arc<dyn PartyStore>,
        certificates: Arc<dyn CertificateStore>,
        max_certificate_bytes: usize,
    ) -> Self {
        Self {
            parties,
            certificates,
            max_certificate_bytes,
        }
    }

    pub fn max_certificate_bytes(&self) -> usize {
        self.max_certificate_bytes
    }

    /// Store the upload and append it to the company's certificate list
    pub async fn attach(
        &self,
        caller: &CallerIdentity,
        company_id: PartyId,
        upload: CertificateUpload,
    ) -> Result<Certificate> {
        ensure_member(caller, company_id)?;

        let certificate = NewCertificate::new(
            &upload.name,
            &upload.certificate_type,
            &upload.mime_type,
            &upload.file_name,
            upload.content,
            self.max_certificate_bytes,
        )?;

        let created = self
            .certificates
            .attach(company_id, &certificate)
            .await?
            .ok_or_else(|| Error::NotFound(format!("Company {} not found", company_id)))?;

        tracing::info!(
            company_id,
            certificate_id = created.id,
            size_bytes = created.document.content.len(),
            "Certificate attached"
        );

        Ok(created)
    }

    pub async fn download(&self, certificate_id: CertificateId) -> Result<CertificateDocument> {
        self.certificates
            .get(certificate_id)
            .await?
            .map(|certificate| certificate.document)
            .ok_or_else(|| Error::NotFound(format!("Certificate {} not found", certificate_id)))
    }

    /// Remove a certificate the company currently lists. A certificate owned by
    /// another company is reported as not found and nothing changes.
    pub async fn remove(
        &self,
        caller: &CallerIdentity,
        company_id: PartyId,
        certificate_id: CertificateId,
    ) -> Result<()> {
        ensure_member(caller, company_id)?;

        match self.certificates.detach(company_id, certificate_id).await? {
            DetachOutcome::Removed => {
                tracing::info!(company_id, certificate_id, "Certificate removed");
                Ok(())
            }
            DetachOutcome::PartyNotFound => {
                Err(Error::NotFound(format!("Company {} not found", company_id)))
            }
            DetachOutcome::NotReferenced => Err(Error::NotFound(format!(
                "Certificate {} not found for company {}",
                certificate_id, company_id
            ))),
        }
    }

    pub async fn list(&self, company_id: PartyId) -> Result<Vec<CertificateSummary>> {
        if self.parties.get(company_id).await?.is_none() {
            return Err(Error::NotFound(format!("Company {} not found", company_id)));
        }

        Ok(self.certificates.list_by_party(company_id).await?)
    }
}
