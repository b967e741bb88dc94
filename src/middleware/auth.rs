use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::Next,
    response::Response,
};

use crate::app::AppState;
use crate::auth::validate_jwt;
use crate::database::models::User;
use crate::error::ApiError;

/// Authenticated user resolved from the access token
#[derive(Clone, Debug)]
pub struct AuthUser {
    pub user: User,
}

/// Validate the access token, load its user and inject `AuthUser` into the request
pub async fn require_auth(
    State(state): State<AppState>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_token_from_headers(&headers).map_err(ApiError::unauthorized)?;

    let claims = validate_jwt(&token).map_err(|e| {
        tracing::debug!("Rejected token: {}", e);
        ApiError::unauthorized("Invalid or expired token")
    })?;

    let user = state
        .store
        .user_by_id(claims.sub)
        .await?
        .filter(|user| user.is_active)
        .ok_or_else(|| {
            tracing::warn!("Token for user {} refers to a missing or inactive account", claims.sub);
            ApiError::unauthorized("User inactive or deleted")
        })?;

    request.extensions_mut().insert(AuthUser { user });

    Ok(next.run(request).await)
}

/// Accepts `Bearer <token>` and `Token <token>`
fn extract_token_from_headers(headers: &HeaderMap) -> Result<String, String> {
    let auth_header = headers
        .get(AUTHORIZATION)
        .ok_or_else(|| "Authentication credentials were not provided.".to_string())?;

    let auth_str = auth_header
        .to_str()
        .map_err(|_| "Invalid Authorization header format".to_string())?;

    let token = auth_str
        .strip_prefix("Bearer ")
        .or_else(|| auth_str.strip_prefix("Token "))
        .ok_or_else(|| "Authorization header must use Bearer or Token scheme".to_string())?
        .trim();

    if token.is_empty() {
        return Err("Empty access token".to_string());
    }
    Ok(token.to_string())
}
