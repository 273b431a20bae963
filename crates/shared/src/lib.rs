//! Shared utilities for the NGO manager backend.

pub mod crypto;
pub mod keys;
pub mod pagination;
pub mod password;
pub mod query;
