//! Invitation handlers
//!
//! Bodies are plain `Json`: the service authorizes the caller before it
//! validates the address, so a caller without rights always sees 403.

use axum::{extract::State, http::StatusCode, Json};
use chrono::{DateTime, Utc};
use partyhub_common::Result;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::caller_company;
use crate::api::middleware::{AuthUser, CompaniesState};
use crate::domain::entities::{PartyId, UserInvitation};

/// Request body for sending an invitation
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendInvitationRequest {
    pub email: String,
    pub company_id: PartyId,
}

/// Request body for resending the notification of a pending invitation
#[derive(Debug, Deserialize)]
pub struct ResendInvitationRequest {
    pub email: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvitationResponse {
    pub id: Uuid,
    pub email: String,
    pub company_id: PartyId,
    pub invited_by: Uuid,
    pub created_at: DateTime<Utc>,
}

impl From<UserInvitation> for InvitationResponse {
    fn from(invitation: UserInvitation) -> Self {
        Self {
            id: invitation.id,
            email: invitation.email,
            company_id: invitation.company_id,
            invited_by: invitation.invited_by,
            created_at: invitation.created_at,
        }
    }
}

/// Invite an email address into a company
///
/// **POST /send_invitation**
///
/// A second invitation for a pair that is still pending answers 409. A 502
/// means the invitation was registered but the email was not delivered.
pub async fn send_invitation(
    AuthUser(caller): AuthUser,
    State(state): State<CompaniesState>,
    Json(req): Json<SendInvitationRequest>,
) -> Result<(StatusCode, Json<InvitationResponse>)> {
    let invitation = state
        .services
        .invitations
        .send_invitation(&caller, &req.email, req.company_id)
        .await?;

    Ok((StatusCode::CREATED, Json(invitation.into())))
}

/// Resend the email for a pending invitation of the caller's company
///
/// **POST /invitations/resend**
pub async fn resend_invitation(
    AuthUser(caller): AuthUser,
    State(state): State<CompaniesState>,
    Json(req): Json<ResendInvitationRequest>,
) -> Result<Json<InvitationResponse>> {
    let invitation = state
        .services
        .invitations
        .resend_notification(&caller, &req.email)
        .await?;

    Ok(Json(invitation.into()))
}

/// List pending invitations of the caller's company
///
/// **GET /invitations**
pub async fn list_invitations(
    AuthUser(caller): AuthUser,
    State(state): State<CompaniesState>,
) -> Result<Json<Vec<InvitationResponse>>> {
    let company_id = caller_company(&caller)?;

    let invitations = state
        .services
        .invitations
        .list_pending_invitations(company_id)
        .await?;

    Ok(Json(invitations.into_iter().map(Into::into).collect()))
}
