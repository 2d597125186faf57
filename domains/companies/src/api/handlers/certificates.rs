//! Certificate handlers
//!
//! Uploads arrive as `multipart/form-data` with a `file` part plus `name`
//! and `type` text parts. The content type of the `file` part is stored
//! as supplied.

use axum::{
    extract::{multipart::MultipartError, Multipart, Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use partyhub_common::{Error, Result};

use super::caller_company;
use crate::api::middleware::{AuthUser, CompaniesState};
use crate::domain::entities::{CertificateId, CertificateSummary, PartyId};
use crate::services::CertificateUpload;

fn multipart_error(err: MultipartError) -> Error {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        return Error::Validation("Certificate upload is too large".to_string());
    }
    Error::Validation(format!("Invalid multipart body: {}", err.body_text()))
}

async fn read_upload(mut multipart: Multipart) -> Result<CertificateUpload> {
    let mut file: Option<(String, String, Vec<u8>)> = None;
    let mut name = None;
    let mut certificate_type = None;

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let field_name = field.name().map(str::to_string);
        match field_name.as_deref() {
            Some("file") => {
                let file_name = field.file_name().unwrap_or_default().to_string();
                let mime_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                let content = field.bytes().await.map_err(multipart_error)?.to_vec();
                file = Some((file_name, mime_type, content));
            }
            Some("name") => name = Some(field.text().await.map_err(multipart_error)?),
            Some("type") => certificate_type = Some(field.text().await.map_err(multipart_error)?),
            _ => {}
        }
    }

    let (file_name, mime_type, content) =
        file.ok_or_else(|| Error::Validation("Missing multipart field: file".to_string()))?;

    Ok(CertificateUpload {
        name: name.ok_or_else(|| Error::Validation("Missing multipart field: name".to_string()))?,
        certificate_type: certificate_type
            .ok_or_else(|| Error::Validation("Missing multipart field: type".to_string()))?,
        mime_type,
        file_name,
        content,
    })
}

/// Upload a certificate for the caller's company
///
/// **POST /company-settings/certificate**
pub async fn upload_certificate(
    AuthUser(caller): AuthUser,
    State(state): State<CompaniesState>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<CertificateSummary>)> {
    let company_id = caller_company(&caller)?;
    let upload = read_upload(multipart).await?;

    let certificate = state
        .services
        .certificates
        .attach(&caller, company_id, upload)
        .await?;

    Ok((StatusCode::CREATED, Json(certificate.summary())))
}

/// Download a certificate's document
///
/// **GET /company-settings/certificate/{certificate_id}**
pub async fn download_certificate(
    AuthUser(_caller): AuthUser,
    State(state): State<CompaniesState>,
    Path(certificate_id): Path<CertificateId>,
) -> Result<Response> {
    let document = state
        .services
        .certificates
        .download(certificate_id)
        .await?;

    let disposition = format!(
        "attachment; filename=\"{}\"",
        document.file_name.replace('"', "\\\"")
    );

    Ok((
        [
            (header::CONTENT_TYPE, document.mime_type),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        document.content,
    )
        .into_response())
}

/// Remove a certificate from the caller's company
///
/// **DELETE /company-settings/certificate/{certificate_id}**
pub async fn delete_certificate(
    AuthUser(caller): AuthUser,
    State(state): State<CompaniesState>,
    Path(certificate_id): Path<CertificateId>,
) -> Result<StatusCode> {
    let company_id = caller_company(&caller)?;

    state
        .services
        .certificates
        .remove(&caller, company_id, certificate_id)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

/// List a company's certificates without their payloads
///
/// **GET /company-settings/{company_id}/certificates**
pub async fn list_certificates(
    AuthUser(_caller): AuthUser,
    State(state): State<CompaniesState>,
    Path(company_id): Path<PartyId>,
) -> Result<Json<Vec<CertificateSummary>>> {
    let certificates = state.services.certificates.list(company_id).await?;
    Ok(Json(certificates))
}
