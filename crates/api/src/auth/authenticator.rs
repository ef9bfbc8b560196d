//! Per-request authentication decision.
//!
//! ```text
//! token? ──no──> TokenMissing
//!   │
//! verify (signature, alg, iss, exp) ──fail──> TokenInvalid / TokenExpired
//!   │
//! load session by claims.session_id ──none──> SessionNotFound
//!   │
//! owner matches, session not expired ──no──> SessionInvalidated
//!   │
//! touch last_activity (best effort)
//!   │
//! ACCEPT(Principal)
//! ```
//!
//! A revocation that lands while a request is already past the session load
//! does not stop that request; it takes effect for the next one.

use std::sync::Arc;

use chrono::Utc;
use sentinel_core::error::AuthError;
use sentinel_core::principal::Principal;
use sentinel_db::store::SessionStore;

use super::jwt::TokenCodec;
use super::{with_deadline, SessionPolicy};

pub struct Authenticator {
    codec: Arc<TokenCodec>,
    sessions: Arc<dyn SessionStore>,
    policy: SessionPolicy,
}

impl Authenticator {
    pub fn new(
        codec: Arc<TokenCodec>,
        sessions: Arc<dyn SessionStore>,
        policy: SessionPolicy,
    ) -> Self {
        Self {
            codec,
            sessions,
            policy,
        }
    }

    /// Decide whether `token` identifies a live session.
    pub async fn authenticate(&self, token: Option<&str>) -> Result<Principal, AuthError> {
        let token = token
            .filter(|t| !t.is_empty())
            .ok_or(AuthError::TokenMissing)?;

        // A bad or expired token never reaches the store.
        let claims = self.codec.verify(token)?;

        let session = with_deadline(
            self.policy.store_timeout,
            self.sessions.get_by_session_id(claims.session_id),
        )
        .await?
        .ok_or(AuthError::SessionNotFound)?;

        if session.user_id != claims.user_id || session.is_expired_at(Utc::now()) {
            return Err(AuthError::SessionInvalidated);
        }

        // The session is already proven valid; a failed touch must not lock the user out.
        if let Err(e) = with_deadline(
            self.policy.store_timeout,
            self.sessions.update_last_activity(session.session_id),
        )
        .await
        {
            tracing::warn!(
                session_id = %session.session_id,
                error = %e,
                "Failed to update session last activity"
            );
        }

        Ok(claims.principal())
    }
}
