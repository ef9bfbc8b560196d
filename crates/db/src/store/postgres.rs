//! Postgres-backed stores. Reads go to the replica, writes to the primary.

use async_trait::async_trait;
use chrono::Utc;
use sentinel_core::types::{DbId, SessionId, Timestamp};

use super::{SessionStore, StoreError, StoreHealth, UserDirectory};
use crate::models::session::{CreateSession, Session};
use crate::models::user::{CreateUser, User};
use crate::repositories::{SessionRepo, UserRepo};
use crate::DbPools;

pub struct PgSessionStore {
    pools: DbPools,
}

impl PgSessionStore {
    pub fn new(pools: DbPools) -> Self {
        Self { pools }
    }
}

#[async_trait]
impl SessionStore for PgSessionStore {
    async fn create(&self, input: &CreateSession) -> Result<Session, StoreError> {
        Ok(SessionRepo::create(self.pools.writer(), input).await?)
    }

    async fn get_by_session_id(
        &self,
        session_id: SessionId,
    ) -> Result<Option<Session>, StoreError> {
        Ok(SessionRepo::find_by_id(self.pools.reader(), session_id).await?)
    }

    async fn get_by_user_id(&self, user_id: DbId) -> Result<Vec<Session>, StoreError> {
        Ok(SessionRepo::list_for_user(self.pools.reader(), user_id).await?)
    }

    async fn update_last_activity(&self, session_id: SessionId) -> Result<(), StoreError> {
        Ok(SessionRepo::touch(self.pools.writer(), session_id, Utc::now()).await?)
    }

    async fn invalidate_session(&self, session_id: SessionId) -> Result<(), StoreError> {
        let removed = SessionRepo::delete(self.pools.writer(), session_id).await?;
        if !removed {
            tracing::debug!(%session_id, "Session already gone");
        }
        Ok(())
    }

    async fn invalidate_all_for_user(&self, user_id: DbId) -> Result<u64, StoreError> {
        Ok(SessionRepo::delete_all_for_user(self.pools.writer(), user_id).await?)
    }

    async fn purge_expired(&self, now: Timestamp) -> Result<u64, StoreError> {
        Ok(SessionRepo::delete_expired(self.pools.writer(), now).await?)
    }

    async fn health(&self) -> StoreHealth {
        let primary = self.pools.writer();
        let healthy = match crate::health_check(primary).await {
            Ok(()) => true,
            Err(e) => {
                tracing::error!(error = %e, "Session store health check failed");
                false
            }
        };

        StoreHealth {
            backend: "postgres",
            healthy,
            pool_size: Some(primary.size()),
            pool_idle: Some(primary.num_idle()),
            replica: self.pools.has_replica(),
        }
    }
}

pub struct PgUserDirectory {
    pools: DbPools,
}

impl PgUserDirectory {
    pub fn new(pools: DbPools) -> Self {
        Self { pools }
    }
}

#[async_trait]
impl UserDirectory for PgUserDirectory {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        Ok(UserRepo::find_by_username(self.pools.reader(), username).await?)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        Ok(UserRepo::find_by_email(self.pools.reader(), email).await?)
    }

    async fn find_by_id(&self, id: DbId) -> Result<Option<User>, StoreError> {
        Ok(UserRepo::find_by_id(self.pools.reader(), id).await?)
    }

    async fn create(&self, input: &CreateUser) -> Result<User, StoreError> {
        Ok(UserRepo::create(self.pools.writer(), input).await?)
    }
}
