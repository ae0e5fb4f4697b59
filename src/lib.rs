//! Campus Portal Backend Library
//!
//! Staff authentication, role-based access control and the portal records
//! they gate. Exposed for the binary, integration tests and client tools.

pub mod access;
pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod middleware;
pub mod portal;
pub mod session;
