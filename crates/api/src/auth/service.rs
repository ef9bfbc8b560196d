//! Authentication service: login, logout, revocation and registration.
//!
//! Login is one logical unit: the token is minted for a fresh session id and
//! is only handed out once the session row backing it has been persisted.

use std::sync::Arc;

use sentinel_core::error::{AuthError, CoreError};
use sentinel_core::principal::Principal;
use sentinel_core::types::{new_session_id, DbId, SessionId};
use sentinel_db::models::session::{CreateSession, Session};
use sentinel_db::models::user::{CreateUser, User, DEFAULT_ROLE};
use sentinel_db::store::{SessionStore, UserDirectory};

use super::jwt::TokenCodec;
use super::password::{hash_password, validate_password_strength, verify_password_or_absent};
use super::{with_deadline, SessionPolicy};

/// Username and plaintext password presented at login.
#[derive(Debug, Clone)]
pub struct LoginCredentials {
    pub username: String,
    pub password: String,
}

/// Provenance recorded on a new session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientInfo {
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub device_info: Option<String>,
}

/// Input for self-registration. The password is plaintext until hashed here.
#[derive(Debug, Clone)]
pub struct RegisterUser {
    pub username: String,
    pub email: String,
    pub password: String,
}

pub struct AuthService {
    users: Arc<dyn UserDirectory>,
    sessions: Arc<dyn SessionStore>,
    codec: Arc<TokenCodec>,
    policy: SessionPolicy,
}

impl AuthService {
    pub fn new(
        users: Arc<dyn UserDirectory>,
        sessions: Arc<dyn SessionStore>,
        codec: Arc<TokenCodec>,
        policy: SessionPolicy,
    ) -> Self {
        Self {
            users,
            sessions,
            codec,
            policy,
        }
    }

    /// Verify credentials, mint a token bound to a new session and persist it.
    ///
    /// The returned session's `access_token` is the token to hand the client.
    pub async fn login(
        &self,
        credentials: &LoginCredentials,
        client: &ClientInfo,
    ) -> Result<(User, Session), AuthError> {
        let result = self.try_login(credentials, client).await;
        match &result {
            Ok((user, session)) => {
                tracing::info!(
                    user_id = user.id,
                    session_id = %session.session_id,
                    ip = client.ip_address.as_deref().unwrap_or("-"),
                    "Login succeeded"
                );
            }
            Err(e) if e.is_credential_failure() || is_validation(e) => {
                tracing::warn!(
                    username = %credentials.username,
                    reason = e.reason(),
                    "Login rejected"
                );
            }
            Err(e) => {
                tracing::error!(
                    username = %credentials.username,
                    reason = e.reason(),
                    error = %e,
                    "Login failed"
                );
            }
        }
        result
    }

    async fn try_login(
        &self,
        credentials: &LoginCredentials,
        client: &ClientInfo,
    ) -> Result<(User, Session), AuthError> {
        let username = credentials.username.trim();
        if username.is_empty() || credentials.password.is_empty() {
            return Err(
                CoreError::Validation("Username and password are required".into()).into(),
            );
        }

        let user = self.deadline(self.users.find_by_username(username)).await?;

        // Unknown users pay for a full verification too.
        let password_valid = check_password(
            &credentials.password,
            user.as_ref().map(|u| u.password_hash.as_str()),
        )
        .await?;

        let user = user.ok_or(AuthError::InvalidCredentials)?;
        if !password_valid {
            return Err(AuthError::InvalidPassword);
        }

        let principal = Principal {
            user_id: user.id,
            email: user.email.clone(),
            username: user.username.clone(),
            session_id: new_session_id(),
        };
        let minted = self.codec.mint(&principal, self.policy.ttl)?;

        let input = CreateSession {
            session_id: principal.session_id,
            user_id: user.id,
            access_token: minted.token,
            ip_address: client.ip_address.clone(),
            user_agent: client.user_agent.clone(),
            device_info: client.device_info.clone(),
            expires_at: minted.claims.expires_at(),
        };

        // The token only exists inside `input`; on failure it is dropped with it.
        let session = self
            .deadline(self.sessions.create(&input))
            .await
            .map_err(|e| match e {
                AuthError::StoreUnavailable(_) => e,
                other => AuthError::StoreUnavailable(other.to_string()),
            })?;

        Ok((user, session))
    }

    /// Revoke the caller's current session. A session that is already gone is fine.
    pub async fn logout(&self, user_id: DbId, session_id: SessionId) -> Result<(), AuthError> {
        match self.revoke_session(user_id, session_id).await {
            Ok(()) | Err(AuthError::SessionNotFound) => Ok(()),
            Err(e) => Err(e),
        }
    }

    /// Revoke one of `user_id`'s own sessions.
    ///
    /// Sessions of other users are reported as missing rather than forbidden.
    pub async fn revoke_session(
        &self,
        user_id: DbId,
        session_id: SessionId,
    ) -> Result<(), AuthError> {
        let session = self
            .deadline(self.sessions.get_by_session_id(session_id))
            .await?
            .filter(|s| s.user_id == user_id)
            .ok_or(AuthError::SessionNotFound)?;

        self.deadline(self.sessions.invalidate_session(session.session_id))
            .await?;
        tracing::info!(user_id, %session_id, "Session revoked");
        Ok(())
    }

    /// Log a user out everywhere. Returns the number of sessions removed.
    pub async fn revoke_all(&self, user_id: DbId) -> Result<u64, AuthError> {
        let removed = self
            .deadline(self.sessions.invalidate_all_for_user(user_id))
            .await?;
        tracing::info!(user_id, removed, "All sessions revoked");
        Ok(removed)
    }

    /// All sessions of a user, newest first.
    pub async fn list_sessions(&self, user_id: DbId) -> Result<Vec<Session>, AuthError> {
        self.deadline(self.sessions.get_by_user_id(user_id)).await
    }

    pub async fn profile(&self, user_id: DbId) -> Result<User, AuthError> {
        self.deadline(self.users.find_by_id(user_id))
            .await?
            .ok_or_else(|| {
                CoreError::NotFound {
                    entity: "user",
                    id: user_id,
                }
                .into()
            })
    }

    /// Create a member account after validating input and checking uniqueness.
    pub async fn register(&self, input: &RegisterUser) -> Result<User, AuthError> {
        let username = input.username.trim();
        let email = input.email.trim();

        if username.is_empty() {
            return Err(CoreError::Validation("Username is required".into()).into());
        }
        if email.is_empty() || !email.contains('@') {
            return Err(CoreError::Validation("A valid email is required".into()).into());
        }
        validate_password_strength(&input.password).map_err(CoreError::Validation)?;

        if self.deadline(self.users.find_by_username(username)).await?.is_some() {
            return Err(CoreError::Conflict("Username already taken".into()).into());
        }
        if self.deadline(self.users.find_by_email(email)).await?.is_some() {
            return Err(CoreError::Conflict("Email already registered".into()).into());
        }

        let password = input.password.clone();
        let password_hash = tokio::task::spawn_blocking(move || hash_password(&password))
            .await
            .map_err(|e| CoreError::Internal(format!("Password hashing task failed: {e}")))?
            .map_err(|e| CoreError::Internal(format!("Password hashing error: {e}")))?;

        let create = CreateUser {
            username: username.to_string(),
            email: email.to_string(),
            password_hash,
            role: DEFAULT_ROLE.to_string(),
            balance: 0,
        };

        // A concurrent registration can still lose the race at insert time.
        let user = self
            .deadline(self.users.create(&create))
            .await
            .map_err(|e| match e {
                AuthError::Core(CoreError::Conflict(constraint)) => {
                    CoreError::Conflict(conflict_message(&constraint)).into()
                }
                other => other,
            })?;

        tracing::info!(user_id = user.id, username = %user.username, "User registered");
        Ok(user)
    }

    async fn deadline<T, F>(&self, call: F) -> Result<T, AuthError>
    where
        F: std::future::Future<Output = Result<T, sentinel_db::store::StoreError>>,
    {
        with_deadline(self.policy.store_timeout, call).await
    }
}

/// Argon2 is CPU-bound; run it off the async workers.
async fn check_password(password: &str, stored_hash: Option<&str>) -> Result<bool, AuthError> {
    let password = password.to_owned();
    let stored_hash = stored_hash.map(str::to_owned);

    let valid = tokio::task::spawn_blocking(move || {
        verify_password_or_absent(&password, stored_hash.as_deref())
    })
    .await
    .map_err(|e| CoreError::Internal(format!("Password verification task failed: {e}")))?
    .map_err(|e| CoreError::Internal(format!("Password verification error: {e}")))?;
    Ok(valid)
}

fn is_validation(err: &AuthError) -> bool {
    matches!(err, AuthError::Core(CoreError::Validation(_)))
}

fn conflict_message(constraint: &str) -> String {
    match constraint {
        "uq_users_username" => "Username already taken".into(),
        "uq_users_email" => "Email already registered".into(),
        other => format!("Duplicate value violates unique constraint: {other}"),
    }
}
