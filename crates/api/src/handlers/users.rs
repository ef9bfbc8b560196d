//! Handlers for the `/users` resource.

use axum::extract::State;
use axum::Json;
use sentinel_db::models::user::UserResponse;

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/users/me
pub async fn me(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
) -> AppResult<Json<DataResponse<UserResponse>>> {
    let user = state.auth.profile(principal.user_id).await?;
    Ok(Json(DataResponse {
        data: UserResponse::from(&user),
    }))
}
