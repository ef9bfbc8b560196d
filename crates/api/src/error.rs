use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use sentinel_core::error::{AuthError, CoreError};

/// Message shared by every credential failure, so responses cannot be used
/// to probe which usernames exist.
pub const INVALID_CREDENTIALS_MESSAGE: &str = "Invalid username or password";

/// Application-level error type for HTTP handlers.
///
/// Wraps [`CoreError`] and [`AuthError`].
/// Implements [`IntoResponse`] to produce consistent JSON error responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `sentinel_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// An authentication or session failure.
    #[error(transparent)]
    Auth(AuthError),
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Core(core) => AppError::Core(core),
            other => AppError::Auth(other),
        }
    }
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Core(core) => classify_core_error(core),
            AppError::Auth(auth) => classify_auth_error(auth),
        };

        let body = json!({
            "error": message,
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}

fn classify_core_error(core: &CoreError) -> (StatusCode, &'static str, String) {
    match core {
        CoreError::NotFound { entity, id } => (
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            format!("{entity} with id {id} not found"),
        ),
        CoreError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
        CoreError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg.clone()),
        CoreError::Internal(msg) => {
            tracing::error!(error = %msg, "Internal core error");
            internal()
        }
    }
}

/// Map an authentication failure to status, code and client-facing message.
///
/// Token and session details stay in the logs; the body names only the class
/// of failure.
fn classify_auth_error(err: &AuthError) -> (StatusCode, &'static str, String) {
    match err {
        AuthError::InvalidCredentials | AuthError::InvalidPassword => (
            StatusCode::UNAUTHORIZED,
            "UNAUTHORIZED",
            INVALID_CREDENTIALS_MESSAGE.to_string(),
        ),
        AuthError::TokenMissing => (
            StatusCode::UNAUTHORIZED,
            "UNAUTHORIZED",
            "Authentication required".to_string(),
        ),
        AuthError::TokenInvalid(_) => (
            StatusCode::UNAUTHORIZED,
            "TOKEN_INVALID",
            "Invalid token".to_string(),
        ),
        AuthError::TokenExpired => (
            StatusCode::UNAUTHORIZED,
            "TOKEN_EXPIRED",
            "Token has expired".to_string(),
        ),
        AuthError::SessionNotFound => (
            StatusCode::UNAUTHORIZED,
            "SESSION_INVALID",
            "Session is no longer valid".to_string(),
        ),
        AuthError::SessionInvalidated => (
            StatusCode::UNAUTHORIZED,
            "SESSION_INVALIDATED",
            "Session has been invalidated".to_string(),
        ),
        AuthError::StoreUnavailable(msg) => {
            tracing::error!(error = %msg, "Session store unavailable");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                "SERVICE_UNAVAILABLE",
                "Authentication is temporarily unavailable".to_string(),
            )
        }
        AuthError::SigningError(msg) => {
            tracing::error!(error = %msg, "Token signing failed");
            internal()
        }
        AuthError::Core(core) => classify_core_error(core),
    }
}

fn internal() -> (StatusCode, &'static str, String) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "INTERNAL_ERROR",
        "An internal error occurred".to_string(),
    )
}
