use axum::{extract::rejection::JsonRejection, extract::State, Json};

use crate::api::user::{TokenRequest, TokenView, UserPayload, UserView};
use crate::app::AppState;
use crate::auth::{generate_jwt, Claims};
use crate::config;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};

pub const BAD_CREDENTIALS: &str = "unable to authenticate with provided credentials";

/// POST /api/user/create - Register a new account
///
/// ```json
/// { "email": "user@example.com", "password": "secret", "name": "User" }
/// ```
///
/// Responds 201 with `{ email, name }`. The password is never echoed back.
pub async fn create(
    State(state): State<AppState>,
    payload: Result<Json<UserPayload>, JsonRejection>,
) -> ApiResult<UserView> {
    let Json(payload) = payload?;
    let registration = payload.validate_full(config::config().security.password_min_length)?;

    let user = state
        .users
        .create_user(&registration.email, Some(&registration.password), &registration.name)
        .await?;

    Ok(ApiResponse::created(UserView::from(&user)))
}

/// POST /api/user/token - Exchange email and password for an access token
///
/// Responds 200 with `{ token }`; any credential problem is a 400.
pub async fn token(
    State(state): State<AppState>,
    payload: Result<Json<TokenRequest>, JsonRejection>,
) -> ApiResult<TokenView> {
    let Json(payload) = payload?;
    let credentials = payload.validate()?;

    let user = state
        .users
        .authenticate(&credentials.email, &credentials.password)
        .await?
        .ok_or_else(|| ApiError::field_error("non_field_errors", BAD_CREDENTIALS))?;

    let token = generate_jwt(&Claims::new(user.id, user.email.clone()))?;
    tracing::info!(user_id = user.id, "Issued access token");

    Ok(ApiResponse::success(TokenView { token }))
}
