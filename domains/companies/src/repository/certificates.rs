//! Certificate repository (Postgres)
//!
//! Attach and detach lock the owning party row (`FOR UPDATE`) so concurrent
//! list edits on the same party are serialized and none is lost.
//!
//! Both run inside `RetryPolicy::run`, where an attempt can time out after its
//! COMMIT reached the server. Attach looks up the upload key before inserting,
//! and a retried detach accepts a certificate that is already gone.

use partyhub_common::{RepositoryError, RetryPolicy};
use sqlx::PgPool;

use super::{CertificateStore, DetachOutcome, StoreResult};
use crate::domain::entities::{
    Certificate, CertificateId, CertificateSummary, NewCertificate, PartyId,
};

#[derive(Clone)]
pub struct PgCertificateStore {
    pool: PgPool,
    retry: RetryPolicy,
}

impl PgCertificateStore {
    pub fn new(pool: PgPool, retry: RetryPolicy) -> Self {
        Self { pool, retry }
    }
}

async fn attach_tx(
    pool: &PgPool,
    party_id: PartyId,
    certificate: &NewCertificate,
) -> StoreResult<Option<Certificate>> {
    let mut tx = pool.begin().await?;

    let locked: Option<(i64,)> = sqlx::query_as("SELECT id FROM parties WHERE id = $1 FOR UPDATE")
        .bind(party_id)
        .fetch_optional(&mut *tx)
        .await?;

    if locked.is_none() {
        return Ok(None);
    }

    let replayed = sqlx::query_as::<_, Certificate>(
        r#"
        SELECT id, party_id, name, certificate_type, mime_type, file_name, content, created_at
        FROM certificates
        WHERE upload_key = $1
        "#,
    )
    .bind(certificate.upload_key)
    .fetch_optional(&mut *tx)
    .await?;

    if replayed.is_some() {
        return Ok(replayed);
    }

    let created = sqlx::query_as::<_, Certificate>(
        r#"
        INSERT INTO certificates (upload_key, party_id, name, certificate_type, mime_type,
                                  file_name, content)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        RETURNING id, party_id, name, certificate_type, mime_type, file_name, content, created_at
        "#,
    )
    .bind(certificate.upload_key)
    .bind(party_id)
    .bind(&certificate.name)
    .bind(&certificate.certificate_type)
    .bind(&certificate.document.mime_type)
    .bind(&certificate.document.file_name)
    .bind(&certificate.document.content)
    .fetch_one(&mut *tx)
    .await?;

    sqlx::query(
        r#"
        UPDATE parties
        SET certificate_ids = array_append(certificate_ids, $2), updated_at = NOW()
        WHERE id = $1
        "#,
    )
    .bind(party_id)
    .bind(created.id)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;

    Ok(Some(created))
}

async fn detach_tx(
    pool: &PgPool,
    party_id: PartyId,
    certificate_id: CertificateId,
    retried: bool,
) -> StoreResult<DetachOutcome> {
    let mut tx = pool.begin().await?;

    let row: Option<(Vec<i64>,)> =
        sqlx::query_as("SELECT certificate_ids FROM parties WHERE id = $1 FOR UPDATE")
            .bind(party_id)
            .fetch_optional(&mut *tx)
            .await?;

    let Some((certificate_ids,)) = row else {
        return Ok(DetachOutcome::PartyNotFound);
    };

    if !certificate_ids.contains(&certificate_id) {
        if retried {
            // An earlier attempt may have committed before timing out
            let (exists,): (bool,) =
                sqlx::query_as("SELECT EXISTS (SELECT 1 FROM certificates WHERE id = $1)")
                    .bind(certificate_id)
                    .fetch_one(&mut *tx)
                    .await?;
            if !exists {
                return Ok(DetachOutcome::Removed);
            }
        }
        return Ok(DetachOutcome::NotReferenced);
    }

    // List first, then the record: the list never references a missing certificate
    sqlx::query(
        r#"
        UPDATE parties
        SET certificate_ids = array_remove(certificate_ids, $2), updated_at = NOW()
        WHERE id = $1
        "#,
    )
    .bind(party_id)
    .bind(certificate_id)
    .execute(&mut *tx)
    .await?;

    sqlx::query("DELETE FROM certificates WHERE id = $1 AND party_id = $2")
        .bind(certificate_id)
        .bind(party_id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    Ok(DetachOutcome::Removed)
}

async fn delete_unreferenced_tx(pool: &PgPool, id: CertificateId) -> StoreResult<bool> {
    let mut tx = pool.begin().await?;

    let (referenced,): (bool,) =
        sqlx::query_as("SELECT EXISTS (SELECT 1 FROM parties WHERE $1 = ANY(certificate_ids))")
            .bind(id)
            .fetch_one(&mut *tx)
            .await?;

    if referenced {
        return Err(RepositoryError::InvalidData(format!(
            "certificate {} is still listed by its party",
            id
        )));
    }

    let result = sqlx::query("DELETE FROM certificates WHERE id = $1")
        .bind(id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    Ok(result.rows_affected() > 0)
}

#[async_trait::async_trait]
impl CertificateStore for PgCertificateStore {
    async fn get(&self, id: CertificateId) -> StoreResult<Option<Certificate>> {
        let pool = &self.pool;
        self.retry
            .run("certificates.get", || async move {
                sqlx::query_as::<_, Certificate>(
                    r#"
                    SELECT id, party_id, name, certificate_type, mime_type, file_name, content,
                           created_at
                    FROM certificates
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

    async fn list_by_party(&self, party_id: PartyId) -> StoreResult<Vec<CertificateSummary>> {
        let pool = &self.pool;
        self.retry
            .run("certificates.list_by_party", || async move {
                sqlx::query_as::<_, CertificateSummary>(
                    r#"
                    SELECT c.id, c.party_id, c.name, c.certificate_type, c.mime_type, c.file_name,
                           octet_length(c.content)::BIGINT AS size_bytes, c.created_at
                    FROM parties p
                    CROSS JOIN LATERAL unnest(p.certificate_ids)
                        WITH ORDINALITY AS owned(certificate_id, position)
                    JOIN certificates c ON c.id = owned.certificate_id
                    WHERE p.id = $1
                    ORDER BY owned.position
                    "#,
                )
                .bind(party_id)
                .fetch_all(pool)
                .await
                .map_err(RepositoryError::from)
            })
            .await
    }

    async fn attach(
        &self,
        party_id: PartyId,
        certificate: &NewCertificate,
    ) -> StoreResult<Option<Certificate>> {
        let pool = &self.pool;
        self.retry
            .run("certificates.attach", || attach_tx(pool, party_id, certificate))
            .await
    }

    async fn detach(
        &self,
        party_id: PartyId,
        certificate_id: CertificateId,
    ) -> StoreResult<DetachOutcome> {
        let pool = &self.pool;
        let mut attempts = 0u32;
        self.retry
            .run("certificates.detach", || {
                attempts += 1;
                detach_tx(pool, party_id, certificate_id, attempts > 1)
            })
            .await
    }

    async fn delete(&self, id: CertificateId) -> StoreResult<bool> {
        let pool = &self.pool;
        self.retry
            .run("certificates.delete", || delete_unreferenced_tx(pool, id))
            .await
    }
}
