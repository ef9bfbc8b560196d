//! Storage seams used by the authentication layer.
//!
//! - [`SessionStore`] -- durable record of live sessions.
//! - [`UserDirectory`] -- read/create access to user accounts.
//!
//! [`postgres`] implements both against [`DbPools`](crate::DbPools), reading from
//! the replica and writing to the primary. [`memory`] keeps everything in
//! process and backs the test suites and single-node development.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use serde::Serialize;
use sentinel_core::types::{DbId, SessionId, Timestamp};

use crate::models::session::{CreateSession, Session};
use crate::models::user::{CreateUser, User};

pub use memory::{MemorySessionStore, MemoryUserDirectory};
pub use postgres::{PgSessionStore, PgUserDirectory};

/// Errors surfaced by store implementations.
#[derive(Debug, Clone, thiserror::Error)]
pub enum StoreError {
    /// A uniqueness constraint rejected the write. Carries the constraint name.
    #[error("Unique constraint violated: {0}")]
    Conflict(String),

    /// The backing store could not be reached or failed mid-operation.
    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            // PostgreSQL unique constraint violation: error code 23505
            if db_err.code().as_deref() == Some("23505") {
                let constraint = db_err.constraint().unwrap_or("unknown");
                return StoreError::Conflict(constraint.to_string());
            }
        }
        StoreError::Unavailable(err.to_string())
    }
}

/// Reachability and pool statistics reported by `GET /health`.
#[derive(Debug, Clone, Serialize)]
pub struct StoreHealth {
    pub backend: &'static str,
    pub healthy: bool,
    /// Open connections on the primary pool, if pooled.
    pub pool_size: Option<u32>,
    /// Idle connections on the primary pool, if pooled.
    pub pool_idle: Option<usize>,
    pub replica: bool,
}

/// Durable record of active sessions.
///
/// Revocation is a hard delete, so a session exists exactly as long as it may
/// be honoured. All methods are cancel-safe: dropping the future abandons the
/// call, which is how callers impose deadlines.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Insert a session and return the stored row with server-assigned timestamps.
    async fn create(&self, input: &CreateSession) -> Result<Session, StoreError>;

    async fn get_by_session_id(&self, session_id: SessionId)
        -> Result<Option<Session>, StoreError>;

    /// All sessions of a user, most recently created first.
    async fn get_by_user_id(&self, user_id: DbId) -> Result<Vec<Session>, StoreError>;

    /// Set `last_activity` and `updated_at` to now. Last write wins.
    async fn update_last_activity(&self, session_id: SessionId) -> Result<(), StoreError>;

    /// Remove one session. Removing a missing session is not an error.
    async fn invalidate_session(&self, session_id: SessionId) -> Result<(), StoreError>;

    /// Remove every session owned by `user_id`, returning how many were removed.
    async fn invalidate_all_for_user(&self, user_id: DbId) -> Result<u64, StoreError>;

    /// Remove sessions whose `expires_at` is at or before `now`.
    async fn purge_expired(&self, now: Timestamp) -> Result<u64, StoreError>;

    async fn health(&self) -> StoreHealth;
}

/// User accounts as seen by the authentication layer.
///
/// Uniqueness of username and email is enforced here; a violating
/// [`UserDirectory::create`] fails with [`StoreError::Conflict`].
#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, StoreError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;

    async fn find_by_id(&self, id: DbId) -> Result<Option<User>, StoreError>;

    async fn create(&self, input: &CreateUser) -> Result<User, StoreError>;
}
