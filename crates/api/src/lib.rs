//! HTTP API for the NGO management backend.

pub mod app;
pub mod config;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod services;
