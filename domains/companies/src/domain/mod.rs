//! Domain layer for the companies domain

pub mod entities;
pub mod state;
pub mod validation;
