//! Platform user repository (Postgres)

use partyhub_common::{RepositoryError, RetryPolicy};
use sqlx::PgPool;
use uuid::Uuid;

use super::{StoreResult, UserStore};
use crate::domain::entities::PlatformUser;

#[derive(Clone)]
pub struct PgUserStore {
    pool: PgPool,
    retry: RetryPolicy,
}

impl PgUserStore {
    pub fn new(pool: PgPool, retry: RetryPolicy) -> Self {
        Self { pool, retry }
    }
}

#[async_trait::async_trait]
impl UserStore for PgUserStore {
    async fn get(&self, id: Uuid) -> StoreResult<Option<PlatformUser>> {
        let pool = &self.pool;
        self.retry
            .run("users.get", || async move {
                sqlx::query_as::<_, PlatformUser>(
                    r#"
                    SELECT id, email, first_name, family_name, company_id
                    FROM platform_users
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
}
