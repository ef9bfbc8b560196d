pub mod auth;
pub mod health;
pub mod sessions;
pub mod users;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /auth/register                 register (public)
/// /auth/login                    login (public)
/// /auth/logout                   logout (requires auth)
///
/// /users/me                      profile of the caller
///
/// /sessions                      list, revoke all (requires auth)
/// /sessions/{id}                 revoke one (requires auth)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/users", users::router())
        .nest("/sessions", sessions::router())
}
