//! In-process stores backed by `RwLock<HashMap<..>>`.
//!
//! Same contracts as the Postgres stores, including uniqueness on username and
//! email, so the authentication layer can be exercised without a database.

use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use sentinel_core::types::{DbId, SessionId, Timestamp};
use tokio::sync::RwLock;

use super::{SessionStore, StoreError, StoreHealth, UserDirectory};
use crate::models::session::{CreateSession, Session};
use crate::models::user::{CreateUser, User};

#[derive(Default)]
pub struct MemorySessionStore {
    sessions: RwLock<HashMap<SessionId, Session>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored sessions.
    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn create(&self, input: &CreateSession) -> Result<Session, StoreError> {
        let mut sessions = self.sessions.write().await;
        if sessions.contains_key(&input.session_id) {
            return Err(StoreError::Conflict("sessions_pkey".into()));
        }

        let now = Utc::now();
        let session = Session {
            session_id: input.session_id,
            user_id: input.user_id,
            access_token: input.access_token.clone(),
            ip_address: input.ip_address.clone(),
            user_agent: input.user_agent.clone(),
            device_info: input.device_info.clone(),
            last_activity: now,
            expires_at: input.expires_at,
            created_at: now,
            updated_at: now,
        };
        sessions.insert(session.session_id, session.clone());
        Ok(session)
    }

    async fn get_by_session_id(
        &self,
        session_id: SessionId,
    ) -> Result<Option<Session>, StoreError> {
        Ok(self.sessions.read().await.get(&session_id).cloned())
    }

    async fn get_by_user_id(&self, user_id: DbId) -> Result<Vec<Session>, StoreError> {
        let mut owned: Vec<Session> = self
            .sessions
            .read()
            .await
            .values()
            .filter(|s| s.user_id == user_id)
            .cloned()
            .collect();
        owned.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.session_id.cmp(&a.session_id))
        });
        Ok(owned)
    }

    async fn update_last_activity(&self, session_id: SessionId) -> Result<(), StoreError> {
        if let Some(session) = self.sessions.write().await.get_mut(&session_id) {
            let now = Utc::now();
            session.last_activity = now;
            session.updated_at = now;
        }
        Ok(())
    }

    async fn invalidate_session(&self, session_id: SessionId) -> Result<(), StoreError> {
        self.sessions.write().await.remove(&session_id);
        Ok(())
    }

    async fn invalidate_all_for_user(&self, user_id: DbId) -> Result<u64, StoreError> {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, s| s.user_id != user_id);
        Ok((before - sessions.len()) as u64)
    }

    async fn purge_expired(&self, now: Timestamp) -> Result<u64, StoreError> {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, s| !s.is_expired_at(now));
        Ok((before - sessions.len()) as u64)
    }

    async fn health(&self) -> StoreHealth {
        StoreHealth {
            backend: "memory",
            healthy: true,
            pool_size: None,
            pool_idle: None,
            replica: false,
        }
    }
}

pub struct MemoryUserDirectory {
    users: RwLock<HashMap<DbId, User>>,
    next_id: AtomicI64,
}

impl Default for MemoryUserDirectory {
    fn default() -> Self {
        Self {
            users: RwLock::new(HashMap::new()),
            next_id: AtomicI64::new(1),
        }
    }
}

impl MemoryUserDirectory {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserDirectory for MemoryUserDirectory {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        Ok(self
            .users
            .read()
            .await
            .values()
            .find(|u| !u.is_deleted && u.username == username)
            .cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        Ok(self
            .users
            .read()
            .await
            .values()
            .find(|u| !u.is_deleted && u.email == email)
            .cloned())
    }

    async fn find_by_id(&self, id: DbId) -> Result<Option<User>, StoreError> {
        Ok(self
            .users
            .read()
            .await
            .get(&id)
            .filter(|u| !u.is_deleted)
            .cloned())
    }

    async fn create(&self, input: &CreateUser) -> Result<User, StoreError> {
        let mut users = self.users.write().await;

        // Mirrors the table constraints, which also cover soft-deleted rows.
        if users.values().any(|u| u.username == input.username) {
            return Err(StoreError::Conflict("uq_users_username".into()));
        }
        if users.values().any(|u| u.email == input.email) {
            return Err(StoreError::Conflict("uq_users_email".into()));
        }

        let now = Utc::now();
        let user = User {
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
            username: input.username.clone(),
            email: input.email.clone(),
            password_hash: input.password_hash.clone(),
            role: input.role.clone(),
            balance: input.balance,
            is_deleted: false,
            created_at: now,
            updated_at: now,
        };
        users.insert(user.id, user.clone());
        Ok(user)
    }
}
