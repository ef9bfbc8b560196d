//! The authenticated identity attached to a request.

use serde::{Deserialize, Serialize};

use crate::types::{DbId, SessionId};

/// Resolved identity of the caller after a successful authentication check.
///
/// Request-scoped and never persisted. The same four fields are embedded in
/// every access token, so a `Principal` is also the input to token minting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    pub user_id: DbId,
    pub email: String,
    pub username: String,
    pub session_id: SessionId,
}
