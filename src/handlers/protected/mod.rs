// handlers/protected/mod.rs - Handlers behind token authentication
//
// Every handler here receives `Extension<AuthUser>` injected by
// `middleware::require_auth`, and only ever touches that user's rows.

pub mod recipe; // /api/recipe/recipes[/:id]
pub mod tag; // /api/recipe/tags[/:id]
pub mod user; // /api/user/me
