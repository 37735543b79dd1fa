//! Database repository for session records.
//!
//! Sessions are written once at login, read on every protected request, and
//! deleted lazily when a lookup finds them past their expiry.

use crate::database::models::{CreateSession, Session};
use chrono::Utc;
use sqlx::SqlitePool;

/// Repository for session database operations.
pub struct SessionRepository<'a> {
    /// Shared SQLite connection pool
    pool: &'a SqlitePool,
}

impl<'a> SessionRepository<'a> {
    /// Creates a new SessionRepository instance.
    ///
    /// # Arguments
    /// * `pool` - Reference to SQLite connection pool
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Persists a new session record.
    pub async fn create_session(&self, session: CreateSession) -> Result<Session, sqlx::Error> {
        let created_at = Utc::now();

        sqlx::query_as::<_, Session>(
            r#"
            INSERT INTO sessions (id, token, user_id, expires_at, created_at)
            VALUES (?, ?, ?, ?, ?)
            RETURNING id, token, user_id, expires_at, created_at
            "#,
        )
        .bind(&session.id)
        .bind(&session.token)
        .bind(&session.user_id)
        .bind(session.expires_at)
        .bind(created_at)
        .fetch_one(self.pool)
        .await
    }

    /// Retrieves a session by its opaque token.
    ///
    /// # Returns
    /// `Some(Session)` if found, `None` otherwise
    pub async fn get_session_by_token(&self, token: &str) -> Result<Option<Session>, sqlx::Error> {
        sqlx::query_as::<_, Session>(
            r#"
            SELECT id, token, user_id, expires_at, created_at
            FROM sessions WHERE token = ?
            "#,
        )
        .bind(token)
        .fetch_optional(self.pool)
        .await
    }

    /// Deletes a session by its unique identifier. Deleting an already
    /// removed session is a no-op.
    pub async fn delete_session(&self, id: &str) -> Result<(), sqlx::Error> {
        sqlx::query("DELETE FROM sessions WHERE id = ?")
            .bind(id)
            .execute(self.pool)
            .await?;

        Ok(())
    }
}
