use std::sync::Arc;

use axum::{
    extract::{DefaultBodyLimit, State},
    http::{HeaderValue, StatusCode},
    middleware,
    response::{IntoResponse, Json},
    routing::{get, post, put},
    Router,
};
use serde_json::{json, Value};
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};

use crate::config::{AppConfig, Environment};
use crate::database::Store;
use crate::handlers::{protected, public};
use crate::middleware::require_auth;
use crate::services::UserService;

/// Shared per-request state
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub users: UserService,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self {
            users: UserService::new(store.clone()),
            store,
        }
    }
}

pub fn app(state: AppState, config: &AppConfig) -> Router {
    let mut router = Router::new()
        // Public
        .route("/", get(root))
        .route("/health", get(health))
        .merge(user_public_routes())
        // Token required
        .merge(protected_routes(state.clone()))
        .layer(DefaultBodyLimit::max(config.api.max_request_size_bytes))
        .layer(cors_layer(config));

    if config.api.enable_request_logging {
        router = router.layer(TraceLayer::new_for_http());
    }

    router.with_state(state)
}

fn user_public_routes() -> Router<AppState> {
    Router::new()
        .route("/api/user/create", post(public::user::create))
        .route("/api/user/token", post(public::user::token))
}

fn protected_routes(state: AppState) -> Router<AppState> {
    use protected::{recipe, tag, user};

    Router::new()
        .route("/api/user/me", get(user::me).put(user::replace).patch(user::update))
        .route("/api/recipe/recipes", get(recipe::list).post(recipe::create))
        .route(
            "/api/recipe/recipes/:id",
            get(recipe::retrieve)
                .put(recipe::replace)
                .patch(recipe::update)
                .delete(recipe::destroy),
        )
        .route("/api/recipe/tags", get(tag::list))
        .route(
            "/api/recipe/tags/:id",
            put(tag::update).patch(tag::update).delete(tag::destroy),
        )
        .route_layer(middleware::from_fn_with_state(state, require_auth))
}

fn cors_layer(config: &AppConfig) -> CorsLayer {
    if !config.security.enable_cors {
        return CorsLayer::new();
    }
    if matches!(config.environment, Environment::Development) {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = config
        .security
        .cors_origins
        .iter()
        .filter_map(|origin| HeaderValue::from_str(origin).ok())
        .collect();
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(Any)
        .allow_headers(Any)
}

async fn root() -> Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    Json(json!({
        "success": true,
        "data": {
            "name": "Recipe API",
            "version": version,
            "endpoints": {
                "user_create": "POST /api/user/create (public)",
                "user_token": "POST /api/user/token (public)",
                "user_me": "GET|PUT|PATCH /api/user/me",
                "recipes": "GET|POST /api/recipe/recipes, GET|PUT|PATCH|DELETE /api/recipe/recipes/:id",
                "tags": "GET /api/recipe/tags, PUT|PATCH|DELETE /api/recipe/tags/:id",
                "health": "GET /health (public)"
            }
        }
    }))
}

async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();

    match state.store.health_check().await {
        Ok(_) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "data": {
                    "status": "ok",
                    "timestamp": now,
                    "database": "ok"
                }
            })),
        ),
        Err(e) => {
            tracing::warn!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "success": false,
                    "error": "database unavailable",
                    "data": {
                        "status": "degraded",
                        "timestamp": now
                    }
                })),
            )
        }
    }
}
