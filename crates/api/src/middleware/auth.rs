//! Session-backed authentication extractor for Axum handlers.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use sentinel_core::principal::Principal;

use crate::auth::cookie::{bearer_token, read_cookie};
use crate::error::AppError;
use crate::state::AppState;

/// Authenticated caller.
///
/// The token is taken from `Authorization: Bearer <token>`, falling back to
/// the auth cookie. It must verify and resolve to a live session owned by
/// the same user; otherwise the request is rejected with 401 (or 503 when
/// the session store cannot answer).
///
/// ```ignore
/// async fn my_handler(AuthUser(principal): AuthUser) -> AppResult<Json<()>> {
///     tracing::info!(user_id = principal.user_id, "handling request");
///     Ok(Json(()))
/// }
/// ```
#[derive(Debug, Clone)]
pub struct AuthUser(pub Principal);

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(&parts.headers)
            .or_else(|| read_cookie(&parts.headers, &state.config.cookie.name));

        match state.authenticator.authenticate(token).await {
            Ok(principal) => Ok(AuthUser(principal)),
            Err(err) => {
                tracing::debug!(
                    reason = err.reason(),
                    path = %parts.uri.path(),
                    "Request rejected by authenticator"
                );
                Err(err.into())
            }
        }
    }
}
