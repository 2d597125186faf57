//! Party repository (Postgres)

use partyhub_common::{RepositoryError, RetryPolicy};
use sqlx::PgPool;

use super::{PartyStore, StoreResult};
use crate::domain::entities::{CompanySettings, Party, PartyId};
use crate::domain::state::VerificationStatus;

#[derive(Clone)]
pub struct PgPartyStore {
    pool: PgPool,
    retry: RetryPolicy,
}

impl PgPartyStore {
    pub fn new(pool: PgPool, retry: RetryPolicy) -> Self {
        Self { pool, retry }
    }
}

#[async_trait::async_trait]
impl PartyStore for PgPartyStore {
    async fn get(&self, id: PartyId) -> StoreResult<Option<Party>> {
        let pool = &self.pool;
        self.retry
            .run("parties.get", || async move {
                sqlx::query_as::<_, Party>(
                    r#"
                    SELECT id, name, verification_status, certificate_ids, preferred_categories,
                           website, vat_number, ppap_compatibility_level, created_at, updated_at
                    FROM parties
                    WHERE id = $1
                    "#,
                )
                .bind(id)
                .fetch_optional(pool)
                .await
                .map_err(RepositoryError::from)
            })
            .await
    }

    async fn list_by_verification_status(
        &self,
        status: VerificationStatus,
    ) -> StoreResult<Vec<Party>> {
        let pool = &self.pool;
        self.retry
            .run("parties.list_by_verification_status", || async move {
                sqlx::query_as::<_, Party>(
                    r#"
                    SELECT id, name, verification_status, certificate_ids, preferred_categories,
                           website, vat_number, ppap_compatibility_level, created_at, updated_at
                    FROM parties
                    WHERE verification_status = $1
                    ORDER BY id
                    "#,
                )
                .bind(status)
                .fetch_all(pool)
                .await
                .map_err(RepositoryError::from)
            })
            .await
    }

    async fn save(&self, party: &Party) -> StoreResult<Party> {
        let pool = &self.pool;
        // GREATEST keeps the verification status monotonic on update
        self.retry
            .run("parties.save", || async move {
                sqlx::query_as::<_, Party>(
                    r#"
                    INSERT INTO parties (id, name, verification_status, certificate_ids,
                                         preferred_categories, website, vat_number,
                                         ppap_compatibility_level, created_at, updated_at)
                    VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
                    ON CONFLICT (id) DO UPDATE SET
                        name = EXCLUDED.name,
                        verification_status = GREATEST(parties.verification_status,
                                                       EXCLUDED.verification_status),
                        preferred_categories = EXCLUDED.preferred_categories,
                        website = EXCLUDED.website,
                        vat_number = EXCLUDED.vat_number,
                        ppap_compatibility_level = EXCLUDED.ppap_compatibility_level,
                        updated_at = NOW()
                    RETURNING id, name, verification_status, certificate_ids, preferred_categories,
                              website, vat_number, ppap_compatibility_level, created_at, updated_at
                    "#,
                )
                .bind(party.id)
                .bind(&party.name)
                .bind(party.verification_status)
                .bind(&party.certificate_ids)
                .bind(&party.preferred_categories)
                .bind(&party.website)
                .bind(&party.vat_number)
                .bind(party.ppap_compatibility_level)
                .bind(party.created_at)
                .bind(party.updated_at)
                .fetch_one(pool)
                .await
                .map_err(RepositoryError::from)
            })
            .await
    }

    async fn set_verification_status(
        &self,
        id: PartyId,
        status: VerificationStatus,
    ) -> StoreResult<Option<Party>> {
        let pool = &self.pool;
        self.retry
            .run("parties.set_verification_status", || async move {
                sqlx::query_as::<_, Party>(
                    r#"
                    UPDATE parties
                    SET verification_status = $2, updated_at = NOW()
                    WHERE id = $1
                    RETURNING id, name, verification_status, certificate_ids, preferred_categories,
                              website, vat_number, ppap_compatibility_level, created_at, updated_at
                    "#,
                )
                .bind(id)
                .bind(status)
                .fetch_optional(pool)
                .await
                .map_err(RepositoryError::from)
            })
            .await
    }

    async fn update_settings(
        &self,
        id: PartyId,
        settings: &CompanySettings,
    ) -> StoreResult<Option<Party>> {
        let pool = &self.pool;
        self.retry
            .run("parties.update_settings", || async move {
                sqlx::query_as::<_, Party>(
                    r#"
                    UPDATE parties
                    SET name = $2,
                        website = $3,
                        vat_number = $4,
                        preferred_categories = $5,
                        ppap_compatibility_level = $6,
                        updated_at = NOW()
                    WHERE id = $1
                    RETURNING id, name, verification_status, certificate_ids, preferred_categories,
                              website, vat_number, ppap_compatibility_level, created_at, updated_at
                    "#,
                )
                .bind(id)
                .bind(&settings.name)
                .bind(&settings.website)
                .bind(&settings.vat_number)
                .bind(&settings.preferred_categories)
                .bind(settings.ppap_compatibility_level)
                .fetch_optional(pool)
                .await
                .map_err(RepositoryError::from)
            })
            .await
    }
}
