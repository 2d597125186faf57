//! Shared utilities, configuration, and error handling for Partyhub
//!
//! This crate provides common functionality used across the Partyhub services:
//! - Configuration management following 12-factor principles
//! - Error types for services and the store boundary
//! - Bounded retry for store adapters
//! - Request extractors and paging helpers

pub mod config;
pub mod db;
pub mod error;
pub mod extractors;
pub mod retry;
pub mod state;

pub use db::RepositoryError;
pub use error::{Error, Result};
pub use extractors::{Page, PageRequest, ValidatedJson};
pub use retry::RetryPolicy;
pub use state::StateError;
