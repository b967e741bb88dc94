use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::tag::Tag;

pub const TITLE_MAX_LENGTH: usize = 255;
pub const LINK_MAX_LENGTH: usize = 255;
/// NUMERIC(5, 2)
pub const PRICE_MAX_DIGITS: u32 = 5;
pub const PRICE_DECIMAL_PLACES: u32 = 2;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recipe {
    pub id: i64,
    pub user_id: i64,
    pub title: String,
    pub description: String,
    pub time_minutes: i32,
    pub price: Decimal,
    pub link: String,
    pub tags: Vec<Tag>,
}

impl std::fmt::Display for Recipe {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.title)
    }
}

/// Validated recipe ready to persist. Tags are names, resolved per user on write.
#[derive(Debug, Clone, Default)]
pub struct NewRecipe {
    pub title: String,
    pub description: String,
    pub time_minutes: i32,
    pub price: Decimal,
    pub link: String,
    pub tags: Vec<String>,
}

/// Partial update; `None` leaves a column untouched, `Some(tags)` replaces the tag set
#[derive(Debug, Clone, Default)]
pub struct RecipeChanges {
    pub title: Option<String>,
    pub description: Option<String>,
    pub time_minutes: Option<i32>,
    pub price: Option<Decimal>,
    pub link: Option<String>,
    pub tags: Option<Vec<String>>,
}

impl RecipeChanges {
    /// Apply scalar changes onto an existing recipe
    pub fn apply_to(&self, recipe: &mut Recipe) {
        if let Some(title) = &self.title {
            recipe.title = title.clone();
        }
        if let Some(description) = &self.description {
            recipe.description = description.clone();
        }
        if let Some(time_minutes) = self.time_minutes {
            recipe.time_minutes = time_minutes;
        }
        if let Some(price) = self.price {
            recipe.price = price;
        }
        if let Some(link) = &self.link {
            recipe.link = link.clone();
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct RecipeFilter {
    /// Keep recipes carrying any of these tag ids; empty means no filtering
    pub tag_ids: Vec<i64>,
}

/// Drop blank and repeated tag names, keeping first-seen order
pub fn dedup_tag_names(names: &[String]) -> Vec<String> {
    let mut unique: Vec<String> = Vec::with_capacity(names.len());
    for name in names {
        let name = name.trim();
        if name.is_empty() || unique.iter().any(|n| n == name) {
            continue;
        }
        unique.push(name.to_string());
    }
    unique
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Recipe {
        Recipe {
            id: 1,
            user_id: 1,
            title: "example recipe".to_string(),
            description: "Sample description".to_string(),
            time_minutes: 5,
            price: Decimal::new(550, 2),
            link: String::new(),
            tags: vec![],
        }
    }

    #[test]
    fn displays_as_title() {
        let recipe = sample();
        assert_eq!(recipe.to_string(), recipe.title);
    }

    #[test]
    fn tag_displays_as_name() {
        let tag = Tag { id: 3, user_id: 1, name: "Vegan".to_string() };
        assert_eq!(tag.to_string(), "Vegan");
    }

    #[test]
    fn changes_only_touch_supplied_fields() {
        let mut recipe = sample();
        let changes = RecipeChanges {
            title: Some("new title".to_string()),
            ..Default::default()
        };
        changes.apply_to(&mut recipe);
        assert_eq!(recipe.title, "new title");
        assert_eq!(recipe.time_minutes, 5);
        assert_eq!(recipe.price, Decimal::new(550, 2));
    }

    #[test]
    fn dedups_tag_names() {
        let names = vec![
            "Thai".to_string(),
            " Dinner ".to_string(),
            "Thai".to_string(),
            "  ".to_string(),
        ];
        assert_eq!(dedup_tag_names(&names), vec!["Thai".to_string(), "Dinner".to_string()]);
    }
}
