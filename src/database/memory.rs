use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use tokio::sync::RwLock;

use super::manager::DatabaseError;
use super::models::recipe::dedup_tag_names;
use super::models::{NewRecipe, NewUser, Recipe, RecipeChanges, RecipeFilter, Tag, User};
use super::store::{Store, DUPLICATE_EMAIL, DUPLICATE_TAG};

#[derive(Debug, Clone)]
struct RecipeEntry {
    id: i64,
    user_id: i64,
    title: String,
    description: String,
    time_minutes: i32,
    price: Decimal,
    link: String,
    tag_ids: Vec<i64>,
}

#[derive(Debug, Default)]
struct Tables {
    users: BTreeMap<i64, User>,
    recipes: BTreeMap<i64, RecipeEntry>,
    tags: BTreeMap<i64, Tag>,
    next_user_id: i64,
    next_recipe_id: i64,
    next_tag_id: i64,
}

fn next_id(counter: &mut i64) -> i64 {
    *counter += 1;
    *counter
}

impl Tables {
    fn email_taken(&self, email: &str, except: Option<i64>) -> bool {
        self.users
            .values()
            .any(|u| u.email == email && Some(u.id) != except)
    }

    fn tag_id_for(&mut self, user_id: i64, name: &str) -> i64 {
        if let Some(tag) = self
            .tags
            .values()
            .find(|t| t.user_id == user_id && t.name == name)
        {
            return tag.id;
        }
        let id = next_id(&mut self.next_tag_id);
        self.tags.insert(
            id,
            Tag {
                id,
                user_id,
                name: name.to_string(),
            },
        );
        id
    }

    fn resolve_tags(&mut self, user_id: i64, names: &[String]) -> Vec<i64> {
        dedup_tag_names(names)
            .iter()
            .map(|name| self.tag_id_for(user_id, name))
            .collect()
    }

    fn materialize(&self, entry: &RecipeEntry) -> Recipe {
        let mut tags: Vec<Tag> = entry
            .tag_ids
            .iter()
            .filter_map(|id| self.tags.get(id).cloned())
            .collect();
        tags.sort_by_key(|t| t.id);

        Recipe {
            id: entry.id,
            user_id: entry.user_id,
            title: entry.title.clone(),
            description: entry.description.clone(),
            time_minutes: entry.time_minutes,
            price: entry.price,
            link: entry.link.clone(),
            tags,
        }
    }
}

/// Process-local store. Data lives as long as the value does.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn health_check(&self) -> Result<(), DatabaseError> {
        Ok(())
    }

    async fn insert_user(&self, user: NewUser) -> Result<User, DatabaseError> {
        let mut tables = self.tables.write().await;
        if tables.email_taken(&user.email, None) {
            return Err(DatabaseError::conflict("email", DUPLICATE_EMAIL));
        }

        let id = next_id(&mut tables.next_user_id);
        let user = User {
            id,
            email: user.email,
            name: user.name,
            password_hash: user.password_hash,
            is_active: true,
            is_staff: user.is_staff,
            is_superuser: user.is_superuser,
            last_login: None,
            created_at: Utc::now(),
        };
        tables.users.insert(id, user.clone());
        Ok(user)
    }

    async fn user_by_id(&self, id: i64) -> Result<Option<User>, DatabaseError> {
        Ok(self.tables.read().await.users.get(&id).cloned())
    }

    async fn user_by_email(&self, email: &str) -> Result<Option<User>, DatabaseError> {
        let tables = self.tables.read().await;
        Ok(tables.users.values().find(|u| u.email == email).cloned())
    }

    async fn update_user(&self, user: &User) -> Result<User, DatabaseError> {
        let mut tables = self.tables.write().await;
        if tables.email_taken(&user.email, Some(user.id)) {
            return Err(DatabaseError::conflict("email", DUPLICATE_EMAIL));
        }

        let stored = tables
            .users
            .get_mut(&user.id)
            .ok_or_else(|| DatabaseError::NotFound(format!("user {} not found", user.id)))?;
        stored.email = user.email.clone();
        stored.name = user.name.clone();
        stored.password_hash = user.password_hash.clone();
        stored.is_active = user.is_active;
        stored.is_staff = user.is_staff;
        stored.is_superuser = user.is_superuser;
        Ok(stored.clone())
    }

    async fn record_login(&self, id: i64, at: DateTime<Utc>) -> Result<(), DatabaseError> {
        if let Some(user) = self.tables.write().await.users.get_mut(&id) {
            user.last_login = Some(at);
        }
        Ok(())
    }

    async fn list_recipes(&self, user_id: i64, filter: &RecipeFilter) -> Result<Vec<Recipe>, DatabaseError> {
        let tables = self.tables.read().await;
        Ok(tables
            .recipes
            .values()
            .rev()
            .filter(|r| r.user_id == user_id)
            .filter(|r| {
                filter.tag_ids.is_empty() || r.tag_ids.iter().any(|id| filter.tag_ids.contains(id))
            })
            .map(|r| tables.materialize(r))
            .collect())
    }

    async fn recipe(&self, user_id: i64, id: i64) -> Result<Option<Recipe>, DatabaseError> {
        let tables = self.tables.read().await;
        Ok(tables
            .recipes
            .get(&id)
            .filter(|r| r.user_id == user_id)
            .map(|r| tables.materialize(r)))
    }

    async fn insert_recipe(&self, user_id: i64, recipe: NewRecipe) -> Result<Recipe, DatabaseError> {
        let mut tables = self.tables.write().await;
        let tag_ids = tables.resolve_tags(user_id, &recipe.tags);
        let id = next_id(&mut tables.next_recipe_id);

        let entry = RecipeEntry {
            id,
            user_id,
            title: recipe.title,
            description: recipe.description,
            time_minutes: recipe.time_minutes,
            price: recipe.price,
            link: recipe.link,
            tag_ids,
        };
        let created = tables.materialize(&entry);
        tables.recipes.insert(id, entry);
        Ok(created)
    }

    async fn update_recipe(
        &self,
        user_id: i64,
        id: i64,
        changes: RecipeChanges,
    ) -> Result<Option<Recipe>, DatabaseError> {
        let mut tables = self.tables.write().await;
        let owned = tables
            .recipes
            .get(&id)
            .map(|r| r.user_id == user_id)
            .unwrap_or(false);
        if !owned {
            return Ok(None);
        }

        let tag_ids = changes
            .tags
            .as_ref()
            .map(|names| tables.resolve_tags(user_id, names));

        let Some(entry) = tables.recipes.get_mut(&id) else {
            return Ok(None);
        };
        let mut recipe = Recipe {
            id: entry.id,
            user_id: entry.user_id,
            title: entry.title.clone(),
            description: entry.description.clone(),
            time_minutes: entry.time_minutes,
            price: entry.price,
            link: entry.link.clone(),
            tags: vec![],
        };
        changes.apply_to(&mut recipe);

        entry.title = recipe.title;
        entry.description = recipe.description;
        entry.time_minutes = recipe.time_minutes;
        entry.price = recipe.price;
        entry.link = recipe.link;
        if let Some(tag_ids) = tag_ids {
            entry.tag_ids = tag_ids;
        }

        let entry = entry.clone();
        Ok(Some(tables.materialize(&entry)))
    }

    async fn delete_recipe(&self, user_id: i64, id: i64) -> Result<bool, DatabaseError> {
        let mut tables = self.tables.write().await;
        let owned = tables.recipes.get(&id).is_some_and(|r| r.user_id == user_id);
        if owned {
            tables.recipes.remove(&id);
        }
        Ok(owned)
    }

    async fn list_tags(&self, user_id: i64, assigned_only: bool) -> Result<Vec<Tag>, DatabaseError> {
        let tables = self.tables.read().await;
        let mut tags: Vec<Tag> = tables
            .tags
            .values()
            .filter(|t| t.user_id == user_id)
            .filter(|t| !assigned_only || tables.recipes.values().any(|r| r.tag_ids.contains(&t.id)))
            .cloned()
            .collect();
        tags.sort_by(|a, b| b.name.cmp(&a.name));
        Ok(tags)
    }

    async fn rename_tag(&self, user_id: i64, id: i64, name: &str) -> Result<Option<Tag>, DatabaseError> {
        let mut tables = self.tables.write().await;
        let clash = tables
            .tags
            .values()
            .any(|t| t.user_id == user_id && t.name == name && t.id != id);

        match tables.tags.get_mut(&id) {
            Some(tag) if tag.user_id == user_id => {
                if clash {
                    return Err(DatabaseError::conflict("name", DUPLICATE_TAG));
                }
                tag.name = name.to_string();
                Ok(Some(tag.clone()))
            }
            _ => Ok(None),
        }
    }

    async fn delete_tag(&self, user_id: i64, id: i64) -> Result<bool, DatabaseError> {
        let mut tables = self.tables.write().await;
        let owned = tables.tags.get(&id).is_some_and(|t| t.user_id == user_id);
        if owned {
            tables.tags.remove(&id);
            for recipe in tables.recipes.values_mut() {
                recipe.tag_ids.retain(|tag_id| *tag_id != id);
            }
        }
        Ok(owned)
    }
}
