//! Handlers for the `/sessions` resource: a user's view of their own sessions.

use axum::extract::{Path, State};
use axum::http::header::SET_COOKIE;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;
use sentinel_core::types::SessionId;
use sentinel_db::models::session::SessionResponse;

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// A listed session, flagged when it is the one making the request.
#[derive(Debug, Serialize)]
pub struct SessionEntry {
    #[serde(flatten)]
    pub session: SessionResponse,
    pub current: bool,
}

#[derive(Debug, Serialize)]
pub struct RevokedCount {
    pub revoked: u64,
}

/// GET /api/v1/sessions
pub async fn list(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
) -> AppResult<Json<DataResponse<Vec<SessionEntry>>>> {
    let sessions = state.auth.list_sessions(principal.user_id).await?;

    let data = sessions
        .iter()
        .map(|s| SessionEntry {
            session: SessionResponse::from(s),
            current: s.session_id == principal.session_id,
        })
        .collect();

    Ok(Json(DataResponse { data }))
}

/// DELETE /api/v1/sessions
///
/// Sign out everywhere, including the calling session.
pub async fn revoke_all(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
) -> AppResult<impl IntoResponse> {
    let revoked = state.auth.revoke_all(principal.user_id).await?;

    Ok((
        [(SET_COOKIE, state.config.cookie.clear())],
        Json(DataResponse {
            data: RevokedCount { revoked },
        }),
    ))
}

/// DELETE /api/v1/sessions/{id}
pub async fn revoke(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    Path(session_id): Path<SessionId>,
) -> AppResult<StatusCode> {
    state
        .auth
        .revoke_session(principal.user_id, session_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
