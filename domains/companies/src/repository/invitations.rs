//! Invitation repository (Postgres)
//!
//! Pending-pair uniqueness is enforced by the partial unique index
//! `uq_user_invitations_pending`; the insert never reads first.

use partyhub_common::{RepositoryError, RetryPolicy};
use sqlx::PgPool;

use super::{InsertOutcome, InvitationStore, StoreResult};
use crate::domain::entities::{NewInvitation, PartyId, UserInvitation};

#[derive(Clone)]
pub struct PgInvitationStore {
    pool: PgPool,
    retry: RetryPolicy,
}

impl PgInvitationStore {
    pub fn new(pool: PgPool, retry: RetryPolicy) -> Self {
        Self { pool, retry }
    }
}

#[async_trait::async_trait]
impl InvitationStore for PgInvitationStore {
    async fn insert_unique(&self, invitation: &NewInvitation) -> StoreResult<InsertOutcome> {
        let pool = &self.pool;
        // One id for every attempt, so a retried insert stays the same row
        let candidate = invitation.clone().into_invitation();
        let candidate = &candidate;

        let inserted = self
            .retry
            .run("invitations.insert_unique", || async move {
                sqlx::query_as::<_, UserInvitation>(
                    r#"
                    INSERT INTO user_invitations (id, email, company_id, invited_by, created_at)
                    VALUES ($1, $2, $3, $4, $5)
                    ON CONFLICT (email, company_id) WHERE consumed_at IS NULL DO NOTHING
                    RETURNING id, email, company_id, invited_by, created_at, consumed_at
                    "#,
                )
                .bind(candidate.id)
                .bind(&candidate.email)
                .bind(candidate.company_id)
                .bind(candidate.invited_by)
                .bind(candidate.created_at)
                .fetch_optional(pool)
                .await
                .map_err(RepositoryError::from)
            })
            .await?;

        if let Some(row) = inserted {
            return Ok(InsertOutcome::Inserted(row));
        }

        // A retried attempt may conflict with its own earlier, committed row
        match self
            .get_pending(&candidate.email, candidate.company_id)
            .await?
        {
            Some(existing) if existing.id == candidate.id => Ok(InsertOutcome::Inserted(existing)),
            _ => Ok(InsertOutcome::Duplicate),
        }
    }

    async fn list_by_company(&self, company_id: PartyId) -> StoreResult<Vec<UserInvitation>> {
        let pool = &self.pool;
        self.retry
            .run("invitations.list_by_company", || async move {
                sqlx::query_as::<_, UserInvitation>(
                    r#"
                    SELECT id, email, company_id, invited_by, created_at, consumed_at
                    FROM user_invitations
                    WHERE company_id = $1
                    ORDER BY created_at, id
                    "#,
                )
                .bind(company_id)
                .fetch_all(pool)
                .await
                .map_err(RepositoryError::from)
            })
            .await
    }

    async fn get_pending(
        &self,
        email: &str,
        company_id: PartyId,
    ) -> StoreResult<Option<UserInvitation>> {
        let pool = &self.pool;
        self.retry
            .run("invitations.get_pending", || async move {
                sqlx::query_as::<_, UserInvitation>(
                    r#"
                    SELECT id, email, company_id, invited_by, created_at, consumed_at
                    FROM user_invitations
                    WHERE email = $1 AND company_id = $2 AND consumed_at IS NULL
                    "#,
                )
                .bind(email)
                .bind(company_id)
                .fetch_optional(pool)
                .await
                .map_err(RepositoryError::from)
            })
            .await
    }

    async fn consume(
        &self,
        email: &str,
        company_id: PartyId,
    ) -> StoreResult<Option<UserInvitation>> {
        let pool = &self.pool;
        self.retry
            .run("invitations.consume", || async move {
                sqlx::query_as::<_, UserInvitation>(
                    r#"
                    UPDATE user_invitations
                    SET consumed_at = NOW()
                    WHERE email = $1 AND company_id = $2 AND consumed_at IS NULL
                    RETURNING id, email, company_id, invited_by, created_at, consumed_at
                    "#,
                )
                .bind(email)
                .bind(company_id)
                .fetch_optional(pool)
                .await
                .map_err(RepositoryError::from)
            })
            .await
    }
}
