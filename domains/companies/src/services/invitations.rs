//! Duplicate-safe invitations into a company
//!
//! The pending `(email, company_id)` pair is claimed by the store's atomic
//! insert before the company is looked up, so deduplication wins over the
//! existence check. A failed notification after a successful insert is
//! surfaced, and the caller is told to resend the notification rather than
//! the invitation.

use std::sync::Arc;
use std::time::Duration;

use partyhub_auth::CallerIdentity;
use partyhub_common::{Error, Result};
use partyhub_email::EmailService;

use crate::domain::entities::{NewInvitation, Party, PartyId, UserInvitation};
use crate::domain::validation::{is_valid_email, normalize_email};
use crate::repository::{InsertOutcome, InvitationStore, PartyStore, UserStore};

#[derive(Clone)]
pub struct InvitationService {
    invitations: Arc<dyn InvitationStore>,
    parties: Arc<dyn PartyStore>,
    users: Arc<dyn UserStore>,
    notifier: Arc<dyn EmailService>,
    notify_timeout: Duration,
}

impl InvitationService {
    pub fn new(
        invitations: Arc<dyn InvitationStore>,
        parties: Arc<dyn PartyStore>,
        users: Arc<dyn UserStore>,
        notifier: Arc<dyn EmailService>,
        notify_timeout: Duration,
    ) -> Self {
        Self {
            invitations,
            parties,
            users,
            notifier,
            notify_timeout,
        }
    }

    pub async fn send_invitation(
        &self,
        caller: &CallerIdentity,
        email: &str,
        company_id: PartyId,
    ) -> Result<UserInvitation> {
        ensure_can_invite(caller, company_id)?;

        let invitation = NewInvitation::new(email, company_id, caller.user_id)?;

        let invitation = match self.invitations.insert_unique(&invitation).await? {
            InsertOutcome::Inserted(invitation) => invitation,
            InsertOutcome::Duplicate => {
                tracing::info!(
                    email = %invitation.email,
                    company_id,
                    "Invitation already pending, not registering twice"
                );
                return Err(Error::Conflict(format!(
                    "An invitation for {} to company {} is already pending",
                    invitation.email, company_id
                )));
            }
        };

        let company = self.company(company_id).await?;
        let sender_name = self.sender_name(caller).await?;

        self.notify(&invitation, &company, &sender_name).await?;

        tracing::info!(
            sender = %sender_name,
            company_id,
            email = %invitation.email,
            "Invitation sent"
        );

        Ok(invitation)
    }

    /// Pending invitations of a company, oldest first
    pub async fn list_pending_invitations(
        &self,
        company_id: PartyId,
    ) -> Result<Vec<UserInvitation>> {
        let invitations = self.invitations.list_by_company(company_id).await?;
        Ok(invitations.into_iter().filter(|i| i.is_pending()).collect())
    }

    /// Dispatch the email for an invitation that is already pending
    pub async fn resend_notification(
        &self,
        caller: &CallerIdentity,
        email: &str,
    ) -> Result<UserInvitation> {
        let company_id = caller.company_id.ok_or_else(|| {
            Error::Authorization("Access denied: Caller has no company".to_string())
        })?;
        ensure_can_invite(caller, company_id)?;

        let email = normalize_email(email);
        if !is_valid_email(&email) {
            return Err(Error::Validation("Invalid email format".to_string()));
        }

        let invitation = self
            .invitations
            .get_pending(&email, company_id)
            .await?
            .ok_or_else(|| {
                Error::NotFound(format!(
                    "No pending invitation for {} to company {}",
                    email, company_id
                ))
            })?;

        let company = self.company(company_id).await?;
        let sender_name = self.sender_name(caller).await?;

        self.notify(&invitation, &company, &sender_name).await?;

        tracing::info!(company_id, email = %invitation.email, "Invitation notification resent");

        Ok(invitation)
    }

    /// Called once the invited user has registered; the pair may be invited again afterwards
    pub async fn consume(&self, email: &str, company_id: PartyId) -> Result<UserInvitation> {
        let email = normalize_email(email);
        let consumed = self
            .invitations
            .consume(&email, company_id)
            .await?
            .ok_or_else(|| {
                Error::NotFound(format!(
                    "No pending invitation for {} to company {}",
                    email, company_id
                ))
            })?;

        tracing::info!(company_id, email = %consumed.email, "Invitation consumed");

        Ok(consumed)
    }

    async fn company(&self, company_id: PartyId) -> Result<Party> {
        self.parties
            .get(company_id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("Company {} not found", company_id)))
    }

    async fn sender_name(&self, caller: &CallerIdentity) -> Result<String> {
        let name = match self.users.get(caller.user_id).await? {
            Some(user) => user.display_name(),
            None => caller
                .email
                .clone()
                .unwrap_or_else(|| caller.user_id.to_string()),
        };
        Ok(name)
    }

    async fn notify(
        &self,
        invitation: &UserInvitation,
        company: &Party,
        sender_name: &str,
    ) -> Result<()> {
        let send = self.notifier.send_company_invitation(
            &invitation.email,
            sender_name,
            &company.name,
            company.id,
        );

        let failure = match tokio::time::timeout(self.notify_timeout, send).await {
            Ok(Ok(_receipt)) => return Ok(()),
            Ok(Err(e)) => e.to_string(),
            Err(_) => format!("timed out after {}ms", self.notify_timeout.as_millis()),
        };

        tracing::warn!(
            company_id = company.id,
            email = %invitation.email,
            error = %failure,
            "Invitation recorded but notification failed"
        );

        Err(Error::Delivery(format!(
            "Invitation for {} is recorded but the email could not be delivered ({}); \
             resend the notification instead of re-sending the invitation",
            invitation.email, failure
        )))
    }
}

fn ensure_can_invite(caller: &CallerIdentity, company_id: PartyId) -> Result<()> {
    if caller.can_invite_for(company_id) {
        return Ok(());
    }

    tracing::info!(
        user_id = %caller.user_id,
        company_id,
        "Rejected invitation from caller without legal representative role for company"
    );
    Err(Error::Authorization(
        "Access denied: Must be a legal representative of this company to invite users"
            .to_string(),
    ))
}
