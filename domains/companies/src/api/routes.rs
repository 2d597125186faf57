//! Route definitions for the companies domain API

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use super::handlers::{admin, certificates, invitations, settings};
use super::middleware::CompaniesState;

/// Room for multipart boundaries and the text parts next to the file
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

/// Create platform administration routes
fn admin_routes() -> Router<CompaniesState> {
    Router::new()
        .route(
            "/admin/unverified_companies",
            get(admin::list_unverified_companies),
        )
        .route("/admin/verify_company", post(admin::verify_company))
}

/// Create company settings and certificate routes
fn settings_routes(max_certificate_bytes: usize) -> Router<CompaniesState> {
    Router::new()
        .route(
            "/company-settings/{company_id}",
            get(settings::get_settings).put(settings::update_settings),
        )
        .route(
            "/company-settings/{company_id}/certificates",
            get(certificates::list_certificates),
        )
        .route(
            "/company-settings/certificate",
            post(certificates::upload_certificate).layer(DefaultBodyLimit::max(
                max_certificate_bytes.saturating_add(MULTIPART_OVERHEAD_BYTES),
            )),
        )
        .route(
            "/company-settings/certificate/{certificate_id}",
            get(certificates::download_certificate).delete(certificates::delete_certificate),
        )
}

/// Create invitation routes
fn invitation_routes() -> Router<CompaniesState> {
    Router::new()
        .route("/send_invitation", post(invitations::send_invitation))
        .route("/invitations", get(invitations::list_invitations))
        .route("/invitations/resend", post(invitations::resend_invitation))
}

/// Create all companies domain API routes
///
/// Certificates above `max_certificate_bytes` are rejected by the lifecycle
/// service; the body limit only has to leave room for them.
pub fn routes(max_certificate_bytes: usize) -> Router<CompaniesState> {
    Router::new()
        .merge(admin_routes())
        .merge(settings_routes(max_certificate_bytes))
        .merge(invitation_routes())
}
