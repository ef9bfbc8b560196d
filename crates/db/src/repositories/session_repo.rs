//! Repository for the `sessions` table.

use sqlx::PgPool;
use sentinel_core::types::{DbId, SessionId, Timestamp};

use crate::models::session::{CreateSession, Session};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "session_id, user_id, access_token, ip_address, user_agent, device_info, \
                       last_activity, expires_at, created_at, updated_at";

/// Provides CRUD operations for sessions.
pub struct SessionRepo;

impl SessionRepo {
    /// Insert a new session, returning the created row with server timestamps.
    pub async fn create(pool: &PgPool, input: &CreateSession) -> Result<Session, sqlx::Error> {
        let query = format!(
            "INSERT INTO sessions
                (session_id, user_id, access_token, ip_address, user_agent, device_info, expires_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Session>(&query)
            .bind(input.session_id)
            .bind(input.user_id)
            .bind(&input.access_token)
            .bind(&input.ip_address)
            .bind(&input.user_agent)
            .bind(&input.device_info)
            .bind(input.expires_at)
            .fetch_one(pool)
            .await
    }

    /// Find a session by its id.
    pub async fn find_by_id(
        pool: &PgPool,
        session_id: SessionId,
    ) -> Result<Option<Session>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM sessions WHERE session_id = $1");
        sqlx::query_as::<_, Session>(&query)
            .bind(session_id)
            .fetch_optional(pool)
            .await
    }

    /// List a user's sessions, most recently created first.
    pub async fn list_for_user(pool: &PgPool, user_id: DbId) -> Result<Vec<Session>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM sessions
             WHERE user_id = $1
             ORDER BY created_at DESC, session_id DESC"
        );
        sqlx::query_as::<_, Session>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await
    }

    /// Set `last_activity` and `updated_at` to `now`. Unconditional write.
    pub async fn touch(pool: &PgPool, session_id: SessionId, now: Timestamp) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE sessions SET last_activity = $2, updated_at = $2 WHERE session_id = $1")
            .bind(session_id)
            .bind(now)
            .execute(pool)
            .await?;
        Ok(())
    }

    /// Delete a single session. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, session_id: SessionId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM sessions WHERE session_id = $1")
            .bind(session_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Delete every session owned by a user. Returns the count of deleted rows.
    pub async fn delete_all_for_user(pool: &PgPool, user_id: DbId) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM sessions WHERE user_id = $1")
            .bind(user_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }

    /// Delete sessions whose expiry is at or before `now`.
    pub async fn delete_expired(pool: &PgPool, now: Timestamp) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM sessions WHERE expires_at <= $1")
            .bind(now)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }
}
