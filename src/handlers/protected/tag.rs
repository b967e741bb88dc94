use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    Extension, Json,
};

use crate::api::parse_flag;
use crate::api::tag::{TagListQuery, TagPayload, TagView};
use crate::app::AppState;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};

/// GET /api/recipe/tags[?assigned_only=1] - Caller's tags, name descending
pub async fn list(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Query(query): Query<TagListQuery>,
) -> ApiResult<Vec<TagView>> {
    let assigned_only = parse_flag(query.assigned_only.as_deref())
        .map_err(|_| ApiError::field_error("assigned_only", "Must be 0 or 1."))?;

    let tags = state.store.list_tags(auth.user.id, assigned_only).await?;
    Ok(ApiResponse::success(tags.iter().map(TagView::from).collect()))
}

/// PUT|PATCH /api/recipe/tags/:id - Rename a tag
pub async fn update(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<i64>,
    payload: Result<Json<TagPayload>, JsonRejection>,
) -> ApiResult<TagView> {
    let Json(payload) = payload?;
    let name = payload.validate()?;

    let tag = state
        .store
        .rename_tag(auth.user.id, id, &name)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("tag {} not found", id)))?;

    Ok(ApiResponse::success(TagView::from(&tag)))
}

/// DELETE /api/recipe/tags/:id
pub async fn destroy(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<i64>,
) -> ApiResult<()> {
    if !state.store.delete_tag(auth.user.id, id).await? {
        return Err(ApiError::not_found(format!("tag {} not found", id)));
    }
    Ok(ApiResponse::no_content())
}
