//! Middleware for protecting authenticated routes.
//!
//! This module contains the request gate: it pulls the session cookie off the
//! incoming request, validates it against the session store, and attaches the
//! resolved identity to the request extensions for downstream handlers.

use crate::api::common::{ErrorResponse, error_response, service_error_to_http};
use crate::auth::models::AuthenticatedUser;
use crate::auth::service::AuthService;
use crate::config::Config;
use axum::{Json, extract::Request, http::StatusCode, middleware::Next, response::Response};
use axum_extra::extract::cookie::CookieJar;
use sqlx::SqlitePool;

/// Name of the cookie carrying the opaque session token.
pub const SESSION_COOKIE: &str = "session_id";

/// Session authentication middleware.
///
/// Rejects the request with a 401 JSON body if the cookie is absent or the
/// session is unknown or expired; otherwise inserts [`AuthenticatedUser`]
/// into the request extensions and lets the request proceed.
pub async fn session_auth(
    mut request: Request,
    next: Next,
) -> Result<Response, (StatusCode, Json<ErrorResponse>)> {
    let jar = CookieJar::from_headers(request.headers());
    let token = jar
        .get(SESSION_COOKIE)
        .map(|cookie| cookie.value().to_owned())
        .ok_or_else(|| error_response(StatusCode::UNAUTHORIZED, "Authorization required"))?;

    // Pool and config are injected as router-level extensions at startup.
    let pool = request
        .extensions()
        .get::<SqlitePool>()
        .cloned()
        .ok_or_else(|| {
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
        })?;
    let config = request.extensions().get::<Config>().cloned().ok_or_else(|| {
        error_response(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
    })?;

    let auth_service = AuthService::new(&pool, config);

    match auth_service.validate_session(&token).await {
        Ok(user_id) => {
            request.extensions_mut().insert(AuthenticatedUser { user_id });
            Ok(next.run(request).await)
        }
        Err(error) => Err(service_error_to_http(error)),
    }
}
