//! Route definitions for the `/sessions` resource.

use axum::routing::{delete, get};
use axum::Router;

use crate::handlers::sessions;
use crate::state::AppState;

/// Routes mounted at `/sessions`. All require auth.
///
/// ```text
/// GET    /      -> list
/// DELETE /      -> revoke_all
/// DELETE /{id}  -> revoke
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(sessions::list).delete(sessions::revoke_all))
        .route("/{id}", delete(sessions::revoke))
}
