//! Application services shared by route handlers.

pub mod accounts;
pub mod authz;
pub mod ngo_bootstrap;
pub mod storage;
