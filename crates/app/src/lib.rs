//! Partyhub application composition root
//!
//! Wires the store adapters, identity resolver and notifier into the
//! companies domain and composes its router with the infrastructure routes.

use std::sync::Arc;

use axum::{routing::get, Router};
use partyhub_auth::{AuthBackend, AuthConfig};
use partyhub_common::config::{Config, StoreBackend};
use partyhub_companies::{
    CompaniesRepositories, CompaniesServices, CompaniesState, MemoryStore, ServiceLimits,
};
use partyhub_email::{EmailConfig, EmailService, EmailServiceFactory};
use sqlx::PgPool;

/// Create the store handles selected by `STORE_BACKEND`
pub async fn create_repositories(config: &Config) -> Result<CompaniesRepositories, anyhow::Error> {
    match config.store_backend {
        StoreBackend::Memory => {
            tracing::warn!("Using in-memory stores; data is lost on restart");
            Ok(CompaniesRepositories::in_memory(Arc::new(MemoryStore::new())))
        }
        StoreBackend::Postgres => {
            let database_url = config.database_url.as_deref().ok_or_else(|| {
                anyhow::anyhow!("DATABASE_URL is required for the postgres backend")
            })?;

            let pool = PgPool::connect(database_url)
                .await
                .map_err(|e| anyhow::anyhow!("Database connection failed: {}", e))?;
            tracing::info!("Database connection established");

            sqlx::migrate!("../../migrations").run(&pool).await?;
            tracing::info!("Database migrations applied");

            Ok(CompaniesRepositories::postgres(pool, config.retry_policy()))
        }
    }
}

/// Build the companies domain state from explicit collaborators
pub fn create_state(
    config: &Config,
    repos: &CompaniesRepositories,
    email: Arc<dyn EmailService>,
) -> CompaniesState {
    let auth = AuthBackend::jwt(AuthConfig {
        jwt_secret: config.jwt_secret.clone(),
        issuer: config.jwt_issuer.clone(),
        audience: config.jwt_audience.clone(),
    });

    let limits = ServiceLimits {
        max_certificate_bytes: config.max_certificate_bytes,
        notify_timeout: config.notify_timeout(),
    };

    CompaniesState {
        services: CompaniesServices::new(repos, email, limits),
        auth,
    }
}

/// Create the main application router with all routes and middleware
pub async fn create_app(config: &Config) -> Result<Router, anyhow::Error> {
    let repos = create_repositories(config).await?;

    let email_config = EmailConfig::from_env()?;
    let email_service = EmailServiceFactory::create(email_config).await?;

    let state = create_state(config, &repos, Arc::from(email_service));

    Ok(build_router(state, config.max_certificate_bytes))
}

/// Compose the domain router with shared infrastructure routes
pub fn build_router(state: CompaniesState, max_certificate_bytes: usize) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route(
            "/",
            get(|| async { concat!("Partyhub API v", env!("CARGO_PKG_VERSION")) }),
        )
        .merge(partyhub_companies::routes(max_certificate_bytes).with_state(state))
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}
