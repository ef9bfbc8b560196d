//! Fixtures shared by the auth unit tests.

use std::sync::Arc;

use async_trait::async_trait;
use sentinel_core::types::{DbId, SessionId, Timestamp};
use sentinel_db::models::session::{CreateSession, Session};
use sentinel_db::models::user::User;
use sentinel_db::store::{
    MemorySessionStore, MemoryUserDirectory, SessionStore, StoreError, StoreHealth,
};

use super::authenticator::Authenticator;
use super::jwt::{JwtConfig, TokenCodec};
use super::service::{AuthService, ClientInfo, LoginCredentials, RegisterUser};
use super::SessionPolicy;

pub const PASSWORD: &str = "correct-horse-battery";

pub struct Fixture {
    pub codec: Arc<TokenCodec>,
    pub sessions: Arc<dyn SessionStore>,
    pub service: AuthService,
    pub authenticator: Authenticator,
}

impl Fixture {
    pub fn new() -> Self {
        Self::with_sessions(Arc::new(MemorySessionStore::new()))
    }

    pub fn with_sessions(sessions: Arc<dyn SessionStore>) -> Self {
        let codec = Arc::new(
            TokenCodec::new(&JwtConfig {
                secret: "unit-test-secret".into(),
                issuer: "sentinel-test".into(),
            })
            .expect("codec"),
        );
        let policy = SessionPolicy::default();
        let users = Arc::new(MemoryUserDirectory::new());
        let service = AuthService::new(users, sessions.clone(), codec.clone(), policy);
        let authenticator = Authenticator::new(codec.clone(), sessions.clone(), policy);
        Self {
            codec,
            sessions,
            service,
            authenticator,
        }
    }

    /// Register `username` with [`PASSWORD`] and `<username>@test.com`.
    pub async fn register(&self, username: &str) -> User {
        self.service
            .register(&RegisterUser {
                username: username.into(),
                email: format!("{username}@test.com"),
                password: PASSWORD.into(),
            })
            .await
            .expect("registration should succeed")
    }
}

pub fn credentials(username: &str, password: &str) -> LoginCredentials {
    LoginCredentials {
        username: username.into(),
        password: password.into(),
    }
}

pub fn client() -> ClientInfo {
    ClientInfo {
        ip_address: Some("203.0.113.7".into()),
        user_agent: Some("unit-test".into()),
        device_info: Some("Device accessing from 203.0.113.7".into()),
    }
}

/// Memory store with switchable failures.
#[derive(Default)]
pub struct FlakySessionStore {
    pub inner: MemorySessionStore,
    fail_create: bool,
    fail_touch: bool,
    fail_reads: bool,
}

impl FlakySessionStore {
    pub fn failing_create() -> Self {
        Self {
            fail_create: true,
            ..Self::default()
        }
    }

    pub fn failing_touch() -> Self {
        Self {
            fail_touch: true,
            ..Self::default()
        }
    }

    pub fn unreachable() -> Self {
        Self {
            fail_create: true,
            fail_touch: true,
            fail_reads: true,
            ..Self::default()
        }
    }

    fn down() -> StoreError {
        StoreError::Unavailable("connection refused".into())
    }
}

#[async_trait]
impl SessionStore for FlakySessionStore {
    async fn create(&self, input: &CreateSession) -> Result<Session, StoreError> {
        if self.fail_create {
            return Err(Self::down());
        }
        self.inner.create(input).await
    }

    async fn get_by_session_id(
        &self,
        session_id: SessionId,
    ) -> Result<Option<Session>, StoreError> {
        if self.fail_reads {
            return Err(Self::down());
        }
        self.inner.get_by_session_id(session_id).await
    }

    async fn get_by_user_id(&self, user_id: DbId) -> Result<Vec<Session>, StoreError> {
        if self.fail_reads {
            return Err(Self::down());
        }
        self.inner.get_by_user_id(user_id).await
    }

    async fn update_last_activity(&self, session_id: SessionId) -> Result<(), StoreError> {
        if self.fail_touch {
            return Err(Self::down());
        }
        self.inner.update_last_activity(session_id).await
    }

    async fn invalidate_session(&self, session_id: SessionId) -> Result<(), StoreError> {
        self.inner.invalidate_session(session_id).await
    }

    async fn invalidate_all_for_user(&self, user_id: DbId) -> Result<u64, StoreError> {
        self.inner.invalidate_all_for_user(user_id).await
    }

    async fn purge_expired(&self, now: Timestamp) -> Result<u64, StoreError> {
        self.inner.purge_expired(now).await
    }

    async fn health(&self) -> StoreHealth {
        self.inner.health().await
    }
}
