//! Defines the HTTP routes for the account service.
//!
//! Signup, login and health are public; the current-user endpoint sits
//! behind the session middleware. These are designed to be integrated into
//! the main Axum router.

use crate::auth::handlers::*;
use crate::auth::middleware::*;
use axum::{
    Router, middleware,
    routing::{get, post},
};

/// Creates the router with all account-related routes
pub fn auth_router() -> Router {
    Router::new()
        .route("/signup", post(signup))
        .route("/login", post(login))
        .route("/health", get(health_check))
        .route("/me", get(me).layer(middleware::from_fn(session_auth)))
}
