//! Domain layer for the NGO manager backend.
//!
//! This crate contains:
//! - Domain models and request/response DTOs
//! - The typed permission catalog and default grant sets
//! - Pure hierarchy algorithms (forest validation, descendant walks)

pub mod hierarchy;
pub mod models;
pub mod permissions;
