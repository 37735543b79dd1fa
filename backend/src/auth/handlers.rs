//! Handler functions for the account API endpoints.
//!
//! These functions process incoming HTTP requests for signup, login, health
//! and the current-user endpoint, parse request data, and interact with the
//! `auth::service` for core business logic.

use crate::api::common::{ErrorResponse, error_response, service_error_to_http};
use crate::auth::middleware::SESSION_COOKIE;
use crate::auth::models::*;
use crate::auth::service::AuthService;
use crate::config::Config;
use axum::{
    extract::{Extension, Json, rejection::JsonRejection},
    http::StatusCode,
    response::Json as ResponseJson,
};
use axum_extra::extract::cookie::{Cookie, CookieJar};
use sqlx::SqlitePool;

/// Handle account signup request
#[axum::debug_handler]
pub async fn signup(
    Extension(pool): Extension<SqlitePool>,
    Extension(config): Extension<Config>,
    payload: Result<Json<SignupRequest>, JsonRejection>,
) -> Result<(StatusCode, ResponseJson<SignupResponse>), (StatusCode, Json<ErrorResponse>)> {
    let Json(payload) = payload.map_err(|_| {
        error_response(
            StatusCode::BAD_REQUEST,
            "Invalid request payload or missing fields",
        )
    })?;

    let auth_service = AuthService::new(&pool, config);

    match auth_service.register(payload).await {
        Ok(user) => Ok((
            StatusCode::CREATED,
            ResponseJson(SignupResponse {
                message: "User created successfully".to_string(),
                user,
            }),
        )),
        Err(error) => Err(service_error_to_http(error)),
    }
}

/// Handle login request. The issued session token is delivered only through
/// an HTTP-only cookie.
#[axum::debug_handler]
pub async fn login(
    Extension(pool): Extension<SqlitePool>,
    Extension(config): Extension<Config>,
    jar: CookieJar,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<(CookieJar, ResponseJson<LoginResponse>), (StatusCode, Json<ErrorResponse>)> {
    let Json(payload) = payload.map_err(|_| {
        error_response(StatusCode::BAD_REQUEST, "Email and password are required")
    })?;

    let max_age = time::Duration::seconds(config.session_expires_in_seconds as i64);
    let auth_service = AuthService::new(&pool, config);

    let (user, session) = match auth_service.authenticate(payload).await {
        Ok(result) => result,
        Err(error) => return Err(service_error_to_http(error)),
    };

    let cookie = Cookie::build((SESSION_COOKIE, session.token))
        .path("/")
        .http_only(true)
        .max_age(max_age)
        .build();

    Ok((
        jar.add(cookie),
        ResponseJson(LoginResponse {
            message: "Login successful".to_string(),
            user,
        }),
    ))
}

/// Get the current user's data. Requires the session middleware to have
/// resolved an identity.
#[axum::debug_handler]
pub async fn me(
    Extension(pool): Extension<SqlitePool>,
    Extension(config): Extension<Config>,
    Extension(authenticated): Extension<AuthenticatedUser>,
) -> Result<ResponseJson<MeResponse>, (StatusCode, Json<ErrorResponse>)> {
    let auth_service = AuthService::new(&pool, config);

    match auth_service.current_user(&authenticated.user_id).await {
        Ok(user) => Ok(ResponseJson(MeResponse {
            status: "success".to_string(),
            user,
        })),
        Err(error) => Err(service_error_to_http(error)),
    }
}

/// Liveness probe, no auth required
#[axum::debug_handler]
pub async fn health_check() -> ResponseJson<HealthResponse> {
    ResponseJson(HealthResponse {
        status: "UP".to_string(),
    })
}
