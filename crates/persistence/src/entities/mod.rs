//! Entity definitions (database row mappings).

pub mod auth_token;
pub mod measurement;
pub mod ngo;
pub mod permission_group;
pub mod reading;
pub mod resource;
pub mod user;
pub mod user_group;
