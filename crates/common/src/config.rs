//! Configuration management following 12-factor app principles
//!
//! All configuration is loaded from environment variables to ensure
//! clean separation between code and config.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;

use crate::retry::RetryPolicy;

/// Default upper bound for an uploaded certificate document (10 MiB)
pub const DEFAULT_MAX_CERTIFICATE_BYTES: usize = 10 * 1024 * 1024;

/// Which persistence adapter backs the stores
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    Postgres,
    Memory,
}

impl std::str::FromStr for StoreBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "postgres" | "pg" => Ok(StoreBackend::Postgres),
            "memory" | "in-memory" => Ok(StoreBackend::Memory),
            other => Err(anyhow::anyhow!(
                "Unknown STORE_BACKEND: {}. Supported backends: postgres, memory",
                other
            )),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub store_backend: StoreBackend,

    /// Database connection URL; required for the postgres backend
    pub database_url: Option<String>,

    /// JWT validation
    pub jwt_secret: String,
    pub jwt_issuer: Option<String>,
    pub jwt_audience: Option<String>,

    /// Store retry policy knobs
    pub store_max_attempts: u32,
    pub store_base_delay_ms: u64,
    pub store_timeout_ms: u64,

    /// Bound on a single invitation email dispatch
    pub notify_timeout_ms: u64,

    pub max_certificate_bytes: usize,

    /// Runtime configuration
    pub rust_log: String,
    pub log_format: String,
    pub port: u16,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // Load .env file if it exists

        let store_backend: StoreBackend = env::var("STORE_BACKEND")
            .unwrap_or_else(|_| "postgres".to_string())
            .parse()?;

        let database_url = env::var("DATABASE_URL").ok();
        if store_backend == StoreBackend::Postgres && database_url.is_none() {
            return Err(anyhow::anyhow!(
                "DATABASE_URL is required when STORE_BACKEND=postgres"
            ));
        }

        let config = Self {
            store_backend,
            database_url,

            jwt_secret: env::var("JWT_SECRET")
                .map_err(|_| anyhow::anyhow!("JWT_SECRET is required"))?,
            jwt_issuer: env::var("JWT_ISSUER").ok(),
            jwt_audience: env::var("JWT_AUDIENCE").ok(),

            store_max_attempts: parse_or("STORE_MAX_ATTEMPTS", 3),
            store_base_delay_ms: parse_or("STORE_BASE_DELAY_MS", 50),
            store_timeout_ms: parse_or("STORE_TIMEOUT_MS", 5_000),
            notify_timeout_ms: parse_or("NOTIFY_TIMEOUT_MS", 10_000),
            max_certificate_bytes: parse_or("MAX_CERTIFICATE_BYTES", DEFAULT_MAX_CERTIFICATE_BYTES),

            rust_log: env::var("RUST_LOG").unwrap_or_else(|_| "partyhub=debug,info".to_string()),
            log_format: env::var("LOG_FORMAT").unwrap_or_else(|_| "pretty".to_string()),
            port: parse_or("PORT", 3000),
        };

        Ok(config)
    }

    /// Retry policy applied at the store-adapter boundary
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::exponential(
            self.store_max_attempts,
            Duration::from_millis(self.store_base_delay_ms),
            Duration::from_millis(self.store_timeout_ms),
        )
    }

    pub fn notify_timeout(&self) -> Duration {
        Duration::from_millis(self.notify_timeout_ms)
    }
}

fn parse_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
