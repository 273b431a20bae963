//! Domain models and request/response DTOs.

pub mod auth;
pub mod measurement;
pub mod ngo;
pub mod permission_group;
pub mod reading;
pub mod resource;
pub mod user;
pub mod user_group;
