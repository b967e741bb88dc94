use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    Extension, Json,
};

use crate::api::parse_id_list;
use crate::api::recipe::{RecipeDetailView, RecipeListQuery, RecipePayload, RecipeView};
use crate::app::AppState;
use crate::database::models::RecipeFilter;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};

fn not_found(id: i64) -> ApiError {
    ApiError::not_found(format!("recipe {} not found", id))
}

/// GET /api/recipe/recipes[?tags=1,2] - Caller's recipes, newest first
pub async fn list(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Query(query): Query<RecipeListQuery>,
) -> ApiResult<Vec<RecipeView>> {
    let tag_ids = parse_id_list(query.tags.as_deref()).map_err(|msg| ApiError::field_error("tags", msg))?;

    let recipes = state
        .store
        .list_recipes(auth.user.id, &RecipeFilter { tag_ids })
        .await?;

    Ok(ApiResponse::success(recipes.iter().map(RecipeView::from).collect()))
}

/// POST /api/recipe/recipes - Create a recipe, creating missing tags by name
pub async fn create(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    payload: Result<Json<RecipePayload>, JsonRejection>,
) -> ApiResult<RecipeDetailView> {
    let Json(payload) = payload?;
    let new_recipe = payload.validate_new()?;

    let recipe = state.store.insert_recipe(auth.user.id, new_recipe).await?;
    tracing::info!(user_id = auth.user.id, recipe_id = recipe.id, "Created recipe {}", recipe);

    Ok(ApiResponse::created(RecipeDetailView::from(&recipe)))
}

/// GET /api/recipe/recipes/:id
pub async fn retrieve(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<i64>,
) -> ApiResult<RecipeDetailView> {
    let recipe = state
        .store
        .recipe(auth.user.id, id)
        .await?
        .ok_or_else(|| not_found(id))?;

    Ok(ApiResponse::success(RecipeDetailView::from(&recipe)))
}

/// PUT /api/recipe/recipes/:id - Full update; tags are replaced only when given
pub async fn replace(
    state: State<AppState>,
    auth: Extension<AuthUser>,
    Path(id): Path<i64>,
    payload: Result<Json<RecipePayload>, JsonRejection>,
) -> ApiResult<RecipeDetailView> {
    apply_update(state, auth, id, payload, false).await
}

/// PATCH /api/recipe/recipes/:id
pub async fn update(
    state: State<AppState>,
    auth: Extension<AuthUser>,
    Path(id): Path<i64>,
    payload: Result<Json<RecipePayload>, JsonRejection>,
) -> ApiResult<RecipeDetailView> {
    apply_update(state, auth, id, payload, true).await
}

async fn apply_update(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    id: i64,
    payload: Result<Json<RecipePayload>, JsonRejection>,
    partial: bool,
) -> ApiResult<RecipeDetailView> {
    let Json(payload) = payload?;
    let changes = payload.validate(partial)?;

    let recipe = state
        .store
        .update_recipe(auth.user.id, id, changes)
        .await?
        .ok_or_else(|| not_found(id))?;

    Ok(ApiResponse::success(RecipeDetailView::from(&recipe)))
}

/// DELETE /api/recipe/recipes/:id
pub async fn destroy(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<i64>,
) -> ApiResult<()> {
    if !state.store.delete_recipe(auth.user.id, id).await? {
        return Err(not_found(id));
    }
    tracing::info!(user_id = auth.user.id, recipe_id = id, "Deleted recipe");
    Ok(ApiResponse::no_content())
}
