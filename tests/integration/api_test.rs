//! API endpoint integration tests
//!
//! Tests for the companies-domain API endpoints: admin, certificates, settings, auth.

#![allow(dead_code)]

mod admin;
mod auth;
mod certificates;
mod common;
mod settings;
