//! Request-scoped and process-wide models used by the server.

pub mod auth;
pub mod config;
