use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::manager::DatabaseError;
use super::models::{NewRecipe, NewUser, Recipe, RecipeChanges, RecipeFilter, Tag, User};

pub const DUPLICATE_EMAIL: &str = "user with this email already exists.";
pub const DUPLICATE_TAG: &str = "tag with this name already exists.";

/// Persistence for users, recipes and tags.
///
/// Recipe and tag operations are always scoped to the owning user; rows of
/// other users behave as if they did not exist.
#[async_trait]
pub trait Store: Send + Sync {
    async fn health_check(&self) -> Result<(), DatabaseError>;

    /// Fails with `Conflict` on `email` when the address is taken
    async fn insert_user(&self, user: NewUser) -> Result<User, DatabaseError>;
    async fn user_by_id(&self, id: i64) -> Result<Option<User>, DatabaseError>;
    async fn user_by_email(&self, email: &str) -> Result<Option<User>, DatabaseError>;
    /// Writes every mutable column of `user`
    async fn update_user(&self, user: &User) -> Result<User, DatabaseError>;
    async fn record_login(&self, id: i64, at: DateTime<Utc>) -> Result<(), DatabaseError>;

    /// Newest first
    async fn list_recipes(&self, user_id: i64, filter: &RecipeFilter) -> Result<Vec<Recipe>, DatabaseError>;
    async fn recipe(&self, user_id: i64, id: i64) -> Result<Option<Recipe>, DatabaseError>;
    /// Tag names are get-or-created for `user_id`
    async fn insert_recipe(&self, user_id: i64, recipe: NewRecipe) -> Result<Recipe, DatabaseError>;
    async fn update_recipe(
        &self,
        user_id: i64,
        id: i64,
        changes: RecipeChanges,
    ) -> Result<Option<Recipe>, DatabaseError>;
    async fn delete_recipe(&self, user_id: i64, id: i64) -> Result<bool, DatabaseError>;

    /// Ordered by name, descending
    async fn list_tags(&self, user_id: i64, assigned_only: bool) -> Result<Vec<Tag>, DatabaseError>;
    async fn rename_tag(&self, user_id: i64, id: i64, name: &str) -> Result<Option<Tag>, DatabaseError>;
    async fn delete_tag(&self, user_id: i64, id: i64) -> Result<bool, DatabaseError>;
}
