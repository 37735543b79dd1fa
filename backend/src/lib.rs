//! User-account service backend.
//!
//! Registers accounts, authenticates with email/password, and serves a
//! protected current-user endpoint gated by a server-side session cookie.

pub mod api;
pub mod auth;
pub mod config;
pub mod database;
pub mod errors;
pub mod repositories;
pub mod utils;

use axum::{Extension, Router};
use config::Config;
use sqlx::SqlitePool;

/// Assembles the application router with its injected dependencies.
///
/// The pool and config ride along as extensions so handlers and the session
/// middleware construct the auth service per request without any process-wide
/// singletons.
pub fn app(pool: SqlitePool, config: Config) -> Router {
    Router::new()
        .merge(auth::routes::auth_router())
        .layer(Extension(pool))
        .layer(Extension(config))
}
