//! Account and session authentication.
//!
//! Covers credential storage and verification, session issuance and
//! validation, and the middleware gate protecting authenticated routes.

pub mod handlers;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod service;
