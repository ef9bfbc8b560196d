use crate::types::DbId;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Failure reasons produced by login, token verification and session checks.
///
/// `InvalidCredentials` and `InvalidPassword` are kept apart so logs can tell
/// an unknown username from a wrong password; the HTTP layer renders both
/// identically.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Unknown username")]
    InvalidCredentials,

    #[error("Password does not match")]
    InvalidPassword,

    #[error("No valid token found")]
    TokenMissing,

    #[error("Invalid token: {0}")]
    TokenInvalid(String),

    #[error("Token expired")]
    TokenExpired,

    #[error("Session not found")]
    SessionNotFound,

    #[error("Session has been invalidated")]
    SessionInvalidated,

    #[error("Session store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("Token signing failed: {0}")]
    SigningError(String),

    #[error(transparent)]
    Core(#[from] CoreError),
}

impl AuthError {
    /// Stable snake_case reason, used as a structured logging field.
    pub fn reason(&self) -> &'static str {
        match self {
            AuthError::InvalidCredentials => "unknown_user",
            AuthError::InvalidPassword => "wrong_password",
            AuthError::TokenMissing => "token_missing",
            AuthError::TokenInvalid(_) => "token_invalid",
            AuthError::TokenExpired => "token_expired",
            AuthError::SessionNotFound => "session_not_found",
            AuthError::SessionInvalidated => "session_invalidated",
            AuthError::StoreUnavailable(_) => "store_unavailable",
            AuthError::SigningError(_) => "signing_error",
            AuthError::Core(CoreError::NotFound { .. }) => "not_found",
            AuthError::Core(CoreError::Validation(_)) => "validation",
            AuthError::Core(CoreError::Conflict(_)) => "conflict",
            AuthError::Core(CoreError::Internal(_)) => "internal",
        }
    }

    /// Whether this error is a credential failure at login.
    pub fn is_credential_failure(&self) -> bool {
        matches!(
            self,
            AuthError::InvalidCredentials | AuthError::InvalidPassword
        )
    }
}
