//! API layer for the companies domain
//!
//! Contains HTTP handlers, routes, and domain state definition.

pub mod handlers;
pub mod middleware;
pub mod routes;

pub use middleware::CompaniesState;
pub use routes::routes;
