//! Core business logic for the authentication system.

use crate::auth::models::*;
use crate::config::Config;
use crate::database::models::{CreateSession, CreateUser, Session};
use crate::errors::{ServiceError, ServiceResult};
use crate::repositories::session_repository::SessionRepository;
use crate::repositories::user_repository::UserRepository;
use crate::utils::generate_random_string::generate_random_string;
use bcrypt::{DEFAULT_COST, hash, verify};
use chrono::{Duration, Utc};
use sqlx::SqlitePool;
use uuid::Uuid;
use validator::Validate;

/// Length of the opaque session token. 64 alphanumeric characters carry
/// roughly 380 bits of entropy.
const SESSION_TOKEN_LENGTH: usize = 64;

/// Authentication service for handling signup, login, and session validation
pub struct AuthService<'a> {
    pool: &'a SqlitePool,
    config: Config,
}

impl<'a> AuthService<'a> {
    /// Create a new AuthService instance with its dependencies injected.
    pub fn new(pool: &'a SqlitePool, config: Config) -> Self {
        AuthService { pool, config }
    }

    /// Register a new account: validate input, hash the password, store the
    /// user. The returned representation omits the password hash.
    pub async fn register(&self, request: SignupRequest) -> ServiceResult<UserInfo> {
        Self::validate_request(&request)?;

        let password_hash = Self::hash_password(&request.password)?;

        let data = CreateUser {
            id: Uuid::now_v7().to_string(),
            username: request.username,
            email: request.email,
            password_hash,
        };

        let repo = UserRepository::new(self.pool);
        let user = self
            .with_store_timeout("create user", repo.create_user(data))
            .await?;

        Ok(user.into())
    }

    /// Verify credentials and issue a new session.
    ///
    /// An unknown email and a wrong password both fail with
    /// `InvalidCredentials` so the caller cannot tell which emails exist.
    pub async fn authenticate(
        &self,
        request: LoginRequest,
    ) -> ServiceResult<(UserInfo, Session)> {
        Self::validate_request(&request)?;

        let user_repo = UserRepository::new(self.pool);
        let user = self
            .with_store_timeout("find user by email", user_repo.get_user_by_email(&request.email))
            .await?
            .ok_or(ServiceError::InvalidCredentials)?;

        if !Self::verify_password(&request.password, &user.password_hash) {
            return Err(ServiceError::InvalidCredentials);
        }

        let token = generate_random_string(SESSION_TOKEN_LENGTH);
        let expires_at =
            Utc::now() + Duration::seconds(self.config.session_expires_in_seconds as i64);

        let session_repo = SessionRepository::new(self.pool);
        let session = self
            .with_store_timeout(
                "create session",
                session_repo.create_session(CreateSession {
                    id: Uuid::now_v7().to_string(),
                    token,
                    user_id: user.id.clone(),
                    expires_at,
                }),
            )
            .await?;

        Ok((user.into(), session))
    }

    /// Resolve a session token to the owning user id.
    ///
    /// An expired session is deleted on first access and reported as
    /// `SessionExpired`; a subsequent lookup of the same token fails with
    /// `Unauthenticated`.
    pub async fn validate_session(&self, token: &str) -> ServiceResult<String> {
        let repo = SessionRepository::new(self.pool);
        let session = self
            .with_store_timeout("find session by token", repo.get_session_by_token(token))
            .await?
            .ok_or(ServiceError::Unauthenticated)?;

        if Utc::now() >= session.expires_at {
            if let Err(error) = self
                .with_store_timeout("delete session", repo.delete_session(&session.id))
                .await
            {
                tracing::warn!("Failed to delete expired session: {}", error);
            }
            return Err(ServiceError::SessionExpired);
        }

        Ok(session.user_id)
    }

    /// Fetch the outward-facing record for an already authenticated user.
    pub async fn current_user(&self, user_id: &str) -> ServiceResult<UserInfo> {
        let repo = UserRepository::new(self.pool);
        let user = self
            .with_store_timeout("find user by id", repo.get_user_by_id(user_id))
            .await?
            .ok_or_else(|| {
                ServiceError::internal(format!("No user record for authenticated id {}", user_id))
            })?;

        Ok(user.into())
    }

    /// Flattens validator errors into a single validation message.
    fn validate_request<T: Validate>(request: &T) -> ServiceResult<()> {
        if let Err(validation_errors) = request.validate() {
            let error_messages: Vec<String> = validation_errors
                .field_errors()
                .into_iter()
                .flat_map(|(field, errors)| {
                    errors.iter().map(move |error| {
                        format!(
                            "{}: {}",
                            field,
                            error.message.as_ref().unwrap_or(&"Invalid value".into())
                        )
                    })
                })
                .collect();
            return Err(ServiceError::validation(error_messages.join(", ")));
        }

        Ok(())
    }

    /// Hashes a password before storing it.
    fn hash_password(password: &str) -> ServiceResult<String> {
        hash(password, DEFAULT_COST)
            .map_err(|e| ServiceError::internal(format!("Failed to hash password: {}", e)))
    }

    /// Compares a plaintext password against a stored hash. Hash parse
    /// failures count as a mismatch.
    fn verify_password(password: &str, password_hash: &str) -> bool {
        verify(password, password_hash).unwrap_or(false)
    }

    /// Bounds a store operation with the configured timeout so a stalled
    /// backend fails the request instead of blocking it indefinitely.
    async fn with_store_timeout<T, F>(&self, operation: &str, future: F) -> ServiceResult<T>
    where
        F: Future<Output = Result<T, sqlx::Error>>,
    {
        let timeout = std::time::Duration::from_secs(self.config.store_timeout_seconds);

        match tokio::time::timeout(timeout, future).await {
            Ok(result) => result.map_err(ServiceError::from),
            Err(_) => Err(ServiceError::timeout(operation)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn test_pool() -> SqlitePool {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        sqlx::migrate!("./migrations").run(&pool).await.unwrap();
        pool
    }

    fn test_config() -> Config {
        Config {
            database_url: "sqlite::memory:".to_string(),
            max_connections: 1,
            acquire_timeout_seconds: 3,
            session_expires_in_seconds: 604800,
            store_timeout_seconds: 5,
            server_port: 0,
        }
    }

    fn signup_request() -> SignupRequest {
        SignupRequest {
            username: "alice".to_string(),
            email: "a@x.com".to_string(),
            password: "secret123".to_string(),
        }
    }

    #[tokio::test]
    async fn test_register_stores_hashed_password() {
        let pool = test_pool().await;
        let service = AuthService::new(&pool, test_config());

        let user = service.register(signup_request()).await.unwrap();
        assert_eq!(user.username, "alice");
        assert_eq!(user.email, "a@x.com");

        let stored = UserRepository::new(&pool)
            .get_user_by_email("a@x.com")
            .await
            .unwrap()
            .unwrap();
        assert_ne!(stored.password_hash, "secret123");
        assert!(bcrypt::verify("secret123", &stored.password_hash).unwrap());
    }

    #[tokio::test]
    async fn test_register_rejects_empty_fields() {
        let pool = test_pool().await;
        let service = AuthService::new(&pool, test_config());

        let result = service
            .register(SignupRequest {
                username: String::new(),
                email: "a@x.com".to_string(),
                password: "secret123".to_string(),
            })
            .await;

        assert!(matches!(result, Err(ServiceError::Validation { .. })));
    }

    #[tokio::test]
    async fn test_register_duplicate_email_keeps_one_user() {
        let pool = test_pool().await;
        let service = AuthService::new(&pool, test_config());

        service.register(signup_request()).await.unwrap();
        let second = service
            .register(SignupRequest {
                username: "bob".to_string(),
                email: "a@x.com".to_string(),
                password: "another456".to_string(),
            })
            .await;

        assert!(matches!(second, Err(ServiceError::DuplicateEmail)));

        let count = UserRepository::new(&pool)
            .count_users_by_email("a@x.com")
            .await
            .unwrap();
        assert_eq!(count, 1);
    }

    #[tokio::test]
    async fn test_authenticate_issues_seven_day_session() {
        let pool = test_pool().await;
        let service = AuthService::new(&pool, test_config());
        service.register(signup_request()).await.unwrap();

        let before = Utc::now();
        let (user, session) = service
            .authenticate(LoginRequest {
                email: "a@x.com".to_string(),
                password: "secret123".to_string(),
            })
            .await
            .unwrap();

        assert_eq!(user.username, "alice");
        assert_eq!(session.user_id, user.id);
        assert_eq!(session.token.len(), SESSION_TOKEN_LENGTH);

        let expected = before + Duration::seconds(604800);
        let skew = (session.expires_at - expected).num_seconds().abs();
        assert!(skew <= 5, "expiry off by {} seconds", skew);
    }

    #[tokio::test]
    async fn test_authenticate_failures_are_indistinguishable() {
        let pool = test_pool().await;
        let service = AuthService::new(&pool, test_config());
        service.register(signup_request()).await.unwrap();

        let wrong_password = service
            .authenticate(LoginRequest {
                email: "a@x.com".to_string(),
                password: "wrong".to_string(),
            })
            .await;
        let unknown_email = service
            .authenticate(LoginRequest {
                email: "nobody@x.com".to_string(),
                password: "secret123".to_string(),
            })
            .await;

        assert!(matches!(
            wrong_password,
            Err(ServiceError::InvalidCredentials)
        ));
        assert!(matches!(
            unknown_email,
            Err(ServiceError::InvalidCredentials)
        ));
    }

    #[tokio::test]
    async fn test_validate_session_resolves_owner() {
        let pool = test_pool().await;
        let service = AuthService::new(&pool, test_config());
        service.register(signup_request()).await.unwrap();

        let (user, session) = service
            .authenticate(LoginRequest {
                email: "a@x.com".to_string(),
                password: "secret123".to_string(),
            })
            .await
            .unwrap();

        let user_id = service.validate_session(&session.token).await.unwrap();
        assert_eq!(user_id, user.id);
    }

    #[tokio::test]
    async fn test_validate_unknown_token_is_unauthenticated() {
        let pool = test_pool().await;
        let service = AuthService::new(&pool, test_config());

        let result = service.validate_session("no-such-token").await;
        assert!(matches!(result, Err(ServiceError::Unauthenticated)));
    }

    #[tokio::test]
    async fn test_expired_session_is_deleted_on_first_access() {
        let pool = test_pool().await;
        let service = AuthService::new(&pool, test_config());
        let user = service.register(signup_request()).await.unwrap();

        let repo = SessionRepository::new(&pool);
        let session = repo
            .create_session(CreateSession {
                id: Uuid::now_v7().to_string(),
                token: generate_random_string(SESSION_TOKEN_LENGTH),
                user_id: user.id,
                expires_at: Utc::now() - Duration::days(1),
            })
            .await
            .unwrap();

        let first = service.validate_session(&session.token).await;
        assert!(matches!(first, Err(ServiceError::SessionExpired)));
        assert!(
            repo.get_session_by_token(&session.token)
                .await
                .unwrap()
                .is_none()
        );

        // Second access finds nothing rather than a different failure mode.
        let second = service.validate_session(&session.token).await;
        assert!(matches!(second, Err(ServiceError::Unauthenticated)));
    }

    #[tokio::test]
    async fn test_current_user_omits_password_hash() {
        let pool = test_pool().await;
        let service = AuthService::new(&pool, test_config());
        let user = service.register(signup_request()).await.unwrap();

        let info = service.current_user(&user.id).await.unwrap();
        let body = serde_json::to_value(&info).unwrap();
        assert_eq!(body["username"], "alice");
        assert!(body.get("password").is_none());
        assert!(body.get("password_hash").is_none());
    }
}
