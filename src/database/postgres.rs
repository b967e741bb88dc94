use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{FromRow, PgConnection, PgPool};
use std::collections::HashMap;

use super::manager::{DatabaseError, DatabaseManager};
use super::models::recipe::dedup_tag_names;
use super::models::{NewRecipe, NewUser, Recipe, RecipeChanges, RecipeFilter, Tag, User};
use super::store::{Store, DUPLICATE_EMAIL, DUPLICATE_TAG};

const USER_COLUMNS: &str =
    "id, email, name, password_hash, is_active, is_staff, is_superuser, last_login, created_at";
const RECIPE_COLUMNS: &str = "id, user_id, title, description, time_minutes, price, link";

#[derive(Debug, FromRow)]
struct RecipeRow {
    id: i64,
    user_id: i64,
    title: String,
    description: String,
    time_minutes: i32,
    price: Decimal,
    link: String,
}

impl RecipeRow {
    fn into_recipe(self, tags: Vec<Tag>) -> Recipe {
        Recipe {
            id: self.id,
            user_id: self.user_id,
            title: self.title,
            description: self.description,
            time_minutes: self.time_minutes,
            price: self.price,
            link: self.link,
            tags,
        }
    }
}

#[derive(Debug, FromRow)]
struct RecipeTagRow {
    recipe_id: i64,
    id: i64,
    user_id: i64,
    name: String,
}

/// sqlx-backed store over the schema in `migrations/`
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Load tags for each row and assemble full recipes, preserving row order
    async fn with_tags(&self, rows: Vec<RecipeRow>) -> Result<Vec<Recipe>, DatabaseError> {
        if rows.is_empty() {
            return Ok(vec![]);
        }
        let ids: Vec<i64> = rows.iter().map(|r| r.id).collect();

        let tag_rows = sqlx::query_as::<_, RecipeTagRow>(
            "SELECT rt.recipe_id, t.id, t.user_id, t.name
             FROM recipe_tags rt
             JOIN tags t ON t.id = rt.tag_id
             WHERE rt.recipe_id = ANY($1)
             ORDER BY t.id",
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await?;

        let mut by_recipe: HashMap<i64, Vec<Tag>> = HashMap::new();
        for row in tag_rows {
            by_recipe.entry(row.recipe_id).or_default().push(Tag {
                id: row.id,
                user_id: row.user_id,
                name: row.name,
            });
        }

        Ok(rows
            .into_iter()
            .map(|row| {
                let tags = by_recipe.remove(&row.id).unwrap_or_default();
                row.into_recipe(tags)
            })
            .collect())
    }

    async fn fetch_recipe(&self, user_id: i64, id: i64) -> Result<Option<Recipe>, DatabaseError> {
        let row = sqlx::query_as::<_, RecipeRow>(&format!(
            "SELECT {RECIPE_COLUMNS} FROM recipes WHERE id = $1 AND user_id = $2"
        ))
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Ok(self.with_tags(vec![row]).await?.pop()),
            None => Ok(None),
        }
    }
}

/// Replace the tag set of a recipe, creating missing tags for the owner
async fn replace_tags(
    conn: &mut PgConnection,
    user_id: i64,
    recipe_id: i64,
    names: &[String],
) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM recipe_tags WHERE recipe_id = $1")
        .bind(recipe_id)
        .execute(&mut *conn)
        .await?;

    for name in dedup_tag_names(names) {
        let (tag_id,): (i64,) = sqlx::query_as(
            "INSERT INTO tags (user_id, name) VALUES ($1, $2)
             ON CONFLICT (user_id, name) DO UPDATE SET name = EXCLUDED.name
             RETURNING id",
        )
        .bind(user_id)
        .bind(&name)
        .fetch_one(&mut *conn)
        .await?;

        sqlx::query(
            "INSERT INTO recipe_tags (recipe_id, tag_id) VALUES ($1, $2)
             ON CONFLICT DO NOTHING",
        )
        .bind(recipe_id)
        .bind(tag_id)
        .execute(&mut *conn)
        .await?;
    }

    Ok(())
}

/// Map a unique-constraint violation onto a field conflict
fn unique_violation(err: sqlx::Error, field: &str, message: &str) -> DatabaseError {
    match &err {
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
            DatabaseError::conflict(field, message)
        }
        _ => DatabaseError::Sqlx(err),
    }
}

#[async_trait]
impl Store for PgStore {
    async fn health_check(&self) -> Result<(), DatabaseError> {
        DatabaseManager::health_check(&self.pool).await
    }

    async fn insert_user(&self, user: NewUser) -> Result<User, DatabaseError> {
        sqlx::query_as::<_, User>(&format!(
            "INSERT INTO users (email, name, password_hash, is_staff, is_superuser)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {USER_COLUMNS}"
        ))
        .bind(&user.email)
        .bind(&user.name)
        .bind(&user.password_hash)
        .bind(user.is_staff)
        .bind(user.is_superuser)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| unique_violation(e, "email", DUPLICATE_EMAIL))
    }

    async fn user_by_id(&self, id: i64) -> Result<Option<User>, DatabaseError> {
        let user = sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn user_by_email(&self, email: &str) -> Result<Option<User>, DatabaseError> {
        let user = sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1"))
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn update_user(&self, user: &User) -> Result<User, DatabaseError> {
        sqlx::query_as::<_, User>(&format!(
            "UPDATE users
             SET email = $2, name = $3, password_hash = $4,
                 is_active = $5, is_staff = $6, is_superuser = $7
             WHERE id = $1
             RETURNING {USER_COLUMNS}"
        ))
        .bind(user.id)
        .bind(&user.email)
        .bind(&user.name)
        .bind(&user.password_hash)
        .bind(user.is_active)
        .bind(user.is_staff)
        .bind(user.is_superuser)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| unique_violation(e, "email", DUPLICATE_EMAIL))?
        .ok_or_else(|| DatabaseError::NotFound(format!("user {} not found", user.id)))
    }

    async fn record_login(&self, id: i64, at: DateTime<Utc>) -> Result<(), DatabaseError> {
        sqlx::query("UPDATE users SET last_login = $2 WHERE id = $1")
            .bind(id)
            .bind(at)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn list_recipes(&self, user_id: i64, filter: &RecipeFilter) -> Result<Vec<Recipe>, DatabaseError> {
        let rows = sqlx::query_as::<_, RecipeRow>(&format!(
            "SELECT {RECIPE_COLUMNS} FROM recipes r
             WHERE r.user_id = $1
               AND (cardinality($2::bigint[]) = 0 OR EXISTS (
                   SELECT 1 FROM recipe_tags rt
                   WHERE rt.recipe_id = r.id AND rt.tag_id = ANY($2)
               ))
             ORDER BY r.id DESC"
        ))
        .bind(user_id)
        .bind(&filter.tag_ids)
        .fetch_all(&self.pool)
        .await?;

        self.with_tags(rows).await
    }

    async fn recipe(&self, user_id: i64, id: i64) -> Result<Option<Recipe>, DatabaseError> {
        self.fetch_recipe(user_id, id).await
    }

    async fn insert_recipe(&self, user_id: i64, recipe: NewRecipe) -> Result<Recipe, DatabaseError> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, RecipeRow>(&format!(
            "INSERT INTO recipes (user_id, title, description, time_minutes, price, link)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {RECIPE_COLUMNS}"
        ))
        .bind(user_id)
        .bind(&recipe.title)
        .bind(&recipe.description)
        .bind(recipe.time_minutes)
        .bind(recipe.price)
        .bind(&recipe.link)
        .fetch_one(&mut *tx)
        .await?;

        replace_tags(&mut *tx, user_id, row.id, &recipe.tags).await?;
        tx.commit().await?;

        self.fetch_recipe(user_id, row.id)
            .await?
            .ok_or_else(|| DatabaseError::NotFound(format!("recipe {} not found", row.id)))
    }

    async fn update_recipe(
        &self,
        user_id: i64,
        id: i64,
        changes: RecipeChanges,
    ) -> Result<Option<Recipe>, DatabaseError> {
        let mut tx = self.pool.begin().await?;

        let existing = sqlx::query_as::<_, RecipeRow>(&format!(
            "SELECT {RECIPE_COLUMNS} FROM recipes WHERE id = $1 AND user_id = $2 FOR UPDATE"
        ))
        .bind(id)
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(existing) = existing else {
            return Ok(None);
        };

        let mut recipe = existing.into_recipe(vec![]);
        changes.apply_to(&mut recipe);

        sqlx::query(
            "UPDATE recipes
             SET title = $3, description = $4, time_minutes = $5, price = $6, link = $7
             WHERE id = $1 AND user_id = $2",
        )
        .bind(id)
        .bind(user_id)
        .bind(&recipe.title)
        .bind(&recipe.description)
        .bind(recipe.time_minutes)
        .bind(recipe.price)
        .bind(&recipe.link)
        .execute(&mut *tx)
        .await?;

        if let Some(tags) = &changes.tags {
            replace_tags(&mut *tx, user_id, id, tags).await?;
        }
        tx.commit().await?;

        self.fetch_recipe(user_id, id).await
    }

    async fn delete_recipe(&self, user_id: i64, id: i64) -> Result<bool, DatabaseError> {
        let result = sqlx::query("DELETE FROM recipes WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_tags(&self, user_id: i64, assigned_only: bool) -> Result<Vec<Tag>, DatabaseError> {
        let tags = sqlx::query_as::<_, Tag>(
            r#"SELECT t.id, t.user_id, t.name FROM tags t
             WHERE t.user_id = $1
               AND ($2::boolean = FALSE OR EXISTS (
                   SELECT 1 FROM recipe_tags rt WHERE rt.tag_id = t.id
               ))
             ORDER BY t.name COLLATE "C" DESC"#,
        )
        .bind(user_id)
        .bind(assigned_only)
        .fetch_all(&self.pool)
        .await?;
        Ok(tags)
    }

    async fn rename_tag(&self, user_id: i64, id: i64, name: &str) -> Result<Option<Tag>, DatabaseError> {
        sqlx::query_as::<_, Tag>(
            "UPDATE tags SET name = $3 WHERE id = $1 AND user_id = $2
             RETURNING id, user_id, name",
        )
        .bind(id)
        .bind(user_id)
        .bind(name)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| unique_violation(e, "name", DUPLICATE_TAG))
    }

    async fn delete_tag(&self, user_id: i64, id: i64) -> Result<bool, DatabaseError> {
        let result = sqlx::query("DELETE FROM tags WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
