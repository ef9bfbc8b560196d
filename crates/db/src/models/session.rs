//! Session model and DTOs.

use serde::Serialize;
use sqlx::FromRow;
use sentinel_core::types::{DbId, SessionId, Timestamp};

/// A row from the `sessions` table.
///
/// Carries the access token it was issued with; never serialize this type
/// directly. Use [`SessionResponse`] for external output.
#[derive(Debug, Clone, FromRow)]
pub struct Session {
    pub session_id: SessionId,
    pub user_id: DbId,
    pub access_token: String,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub device_info: Option<String>,
    pub last_activity: Timestamp,
    pub expires_at: Timestamp,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Session {
    /// A session is dead once `now` reaches its `expires_at`.
    pub fn is_expired_at(&self, now: Timestamp) -> bool {
        self.expires_at <= now
    }
}

/// DTO for inserting a session. `session_id` is generated by the server.
#[derive(Debug, Clone)]
pub struct CreateSession {
    pub session_id: SessionId,
    pub user_id: DbId,
    pub access_token: String,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub device_info: Option<String>,
    pub expires_at: Timestamp,
}

/// Session representation for API responses (no access token).
#[derive(Debug, Clone, Serialize)]
pub struct SessionResponse {
    pub session_id: SessionId,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub device_info: Option<String>,
    pub last_activity: Timestamp,
    pub expires_at: Timestamp,
    pub created_at: Timestamp,
}

impl From<&Session> for SessionResponse {
    fn from(session: &Session) -> Self {
        Self {
            session_id: session.session_id,
            ip_address: session.ip_address.clone(),
            user_agent: session.user_agent.clone(),
            device_info: session.device_info.clone(),
            last_activity: session.last_activity,
            expires_at: session.expires_at,
            created_at: session.created_at,
        }
    }
}
