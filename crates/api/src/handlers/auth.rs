//! Handlers for the `/auth` resource (register, login, logout).

use axum::extract::State;
use axum::http::header::{AUTHORIZATION, SET_COOKIE};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use sentinel_core::types::{SessionId, Timestamp};
use sentinel_db::models::user::UserResponse;

use crate::auth::service::{LoginCredentials, RegisterUser};
use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::middleware::client::ClientMeta;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /auth/login`.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Request body for `POST /auth/register`.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Successful login response.
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub session_id: SessionId,
    pub expires_at: Timestamp,
    pub user: UserResponse,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/auth/register
pub async fn register(
    State(state): State<AppState>,
    Json(input): Json<RegisterRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<UserResponse>>)> {
    let user = state
        .auth
        .register(&RegisterUser {
            username: input.username,
            email: input.email,
            password: input.password,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: UserResponse::from(&user),
        }),
    ))
}

/// POST /api/v1/auth/login
///
/// Authenticate with username + password. The token is returned in the body,
/// the `Authorization` response header and the auth cookie.
pub async fn login(
    State(state): State<AppState>,
    ClientMeta(client): ClientMeta,
    Json(input): Json<LoginRequest>,
) -> AppResult<impl IntoResponse> {
    let credentials = LoginCredentials {
        username: input.username,
        password: input.password,
    };
    let (user, session) = state.auth.login(&credentials, &client).await?;

    let max_age = (session.expires_at - Utc::now()).num_seconds();
    let cookie = state.config.cookie.issue(&session.access_token, max_age);
    let bearer = format!("Bearer {}", session.access_token);

    let body = LoginResponse {
        token: session.access_token,
        session_id: session.session_id,
        expires_at: session.expires_at,
        user: UserResponse::from(&user),
    };

    Ok(([(SET_COOKIE, cookie), (AUTHORIZATION, bearer)], Json(body)))
}

/// POST /api/v1/auth/logout
///
/// Revoke the session the request was authenticated with and clear the cookie.
pub async fn logout(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
) -> AppResult<impl IntoResponse> {
    state
        .auth
        .logout(principal.user_id, principal.session_id)
        .await?;

    Ok((
        StatusCode::NO_CONTENT,
        [(SET_COOKIE, state.config.cookie.clear())],
    ))
}
