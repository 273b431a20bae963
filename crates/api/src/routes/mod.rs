//! HTTP route handlers.

pub mod admins;
pub mod athletes;
pub mod auth;
pub mod coaches;
pub mod health;
pub mod measurement_types;
pub mod measurements;
pub mod ngos;
pub mod permission_groups;
pub mod readings;
pub mod resources;
pub mod user_groups;
pub mod users;
