use axum::{extract::rejection::JsonRejection, extract::State, Extension, Json};

use crate::api::user::{UserPayload, UserView};
use crate::app::AppState;
use crate::config;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::services::user_service::ProfileChanges;

/// GET /api/user/me - Profile of the authenticated user
pub async fn me(Extension(auth): Extension<AuthUser>) -> ApiResult<UserView> {
    Ok(ApiResponse::success(UserView::from(&auth.user)))
}

/// PUT /api/user/me - Replace email, name and password
pub async fn replace(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    payload: Result<Json<UserPayload>, JsonRejection>,
) -> ApiResult<UserView> {
    let Json(payload) = payload?;
    let changes: ProfileChanges = payload
        .validate_full(config::config().security.password_min_length)?
        .into();

    let user = state.users.update_profile(auth.user, changes).await?;
    Ok(ApiResponse::success(UserView::from(&user)))
}

/// PATCH /api/user/me - Update any subset of email, name and password
pub async fn update(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    payload: Result<Json<UserPayload>, JsonRejection>,
) -> ApiResult<UserView> {
    let Json(payload) = payload?;
    let changes = payload.validate_partial(config::config().security.password_min_length)?;

    let user = state.users.update_profile(auth.user, changes).await?;
    Ok(ApiResponse::success(UserView::from(&user)))
}
