use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::str::FromStr;

use super::tag::{TagPayload, TagView};
use super::{FieldErrors, REQUIRED};
use crate::database::models::recipe::{
    LINK_MAX_LENGTH, PRICE_DECIMAL_PLACES, PRICE_MAX_DIGITS, TITLE_MAX_LENGTH,
};
use crate::database::models::tag::TAG_NAME_MAX_LENGTH;
use crate::database::models::{NewRecipe, Recipe, RecipeChanges};
use crate::error::ApiError;

/// List representation; the description is only part of the detail view
#[derive(Debug, Clone, Serialize)]
pub struct RecipeView {
    pub id: i64,
    pub title: String,
    pub time_minutes: i32,
    pub price: Decimal,
    pub link: String,
    pub tags: Vec<TagView>,
}

impl From<&Recipe> for RecipeView {
    fn from(recipe: &Recipe) -> Self {
        Self {
            id: recipe.id,
            title: recipe.title.clone(),
            time_minutes: recipe.time_minutes,
            price: recipe.price,
            link: recipe.link.clone(),
            tags: recipe.tags.iter().map(TagView::from).collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RecipeDetailView {
    #[serde(flatten)]
    pub recipe: RecipeView,
    pub description: String,
}

impl From<&Recipe> for RecipeDetailView {
    fn from(recipe: &Recipe) -> Self {
        Self {
            recipe: RecipeView::from(recipe),
            description: recipe.description.clone(),
        }
    }
}

/// Create/update body. `price` and `time_minutes` accept numbers or numeric strings.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RecipePayload {
    pub title: Option<String>,
    pub time_minutes: Option<Value>,
    pub price: Option<Value>,
    pub link: Option<String>,
    pub description: Option<String>,
    pub tags: Option<Vec<TagPayload>>,
}

impl RecipePayload {
    /// With `partial` unset, title, time_minutes and price are required
    pub fn validate(&self, partial: bool) -> Result<RecipeChanges, ApiError> {
        let required = !partial;
        let mut errors = FieldErrors::new();

        let changes = RecipeChanges {
            title: errors.text("title", self.title.as_deref(), required, false, TITLE_MAX_LENGTH),
            time_minutes: parse_minutes(&mut errors, self.time_minutes.as_ref(), required),
            price: parse_price(&mut errors, self.price.as_ref(), required),
            link: errors.text("link", self.link.as_deref(), false, true, LINK_MAX_LENGTH),
            description: self.description.clone(),
            tags: self.tags.as_ref().and_then(|tags| validate_tags(&mut errors, tags)),
        };

        errors.finish(changes)
    }

    pub fn validate_new(&self) -> Result<NewRecipe, ApiError> {
        let changes = self.validate(false)?;
        Ok(NewRecipe {
            title: changes.title.unwrap_or_default(),
            description: changes.description.unwrap_or_default(),
            time_minutes: changes.time_minutes.unwrap_or_default(),
            price: changes.price.unwrap_or_default(),
            link: changes.link.unwrap_or_default(),
            tags: changes.tags.unwrap_or_default(),
        })
    }
}

fn validate_tags(errors: &mut FieldErrors, tags: &[TagPayload]) -> Option<Vec<String>> {
    let mut names = Vec::with_capacity(tags.len());
    for tag in tags {
        let mut tag_errors = FieldErrors::new();
        match tag_errors.text("name", tag.name.as_deref(), true, false, TAG_NAME_MAX_LENGTH) {
            Some(name) => names.push(name),
            None => {
                errors.add("tags", "Each tag needs a non-blank name of at most 255 characters.");
                return None;
            }
        }
    }
    Some(names)
}

fn parse_minutes(errors: &mut FieldErrors, value: Option<&Value>, required: bool) -> Option<i32> {
    let Some(value) = value else {
        if required {
            errors.add("time_minutes", REQUIRED);
        }
        return None;
    };

    let parsed = match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    };
    let Some(minutes) = parsed else {
        errors.add("time_minutes", "A valid integer is required.");
        return None;
    };

    if minutes < 0 {
        errors.add("time_minutes", "Ensure this value is greater than or equal to 0.");
        return None;
    }
    match i32::try_from(minutes) {
        Ok(minutes) => Some(minutes),
        Err(_) => {
            errors.add(
                "time_minutes",
                format!("Ensure this value is less than or equal to {}.", i32::MAX),
            );
            None
        }
    }
}

/// Validate against NUMERIC(5, 2) and return the value at scale 2
fn parse_price(errors: &mut FieldErrors, value: Option<&Value>, required: bool) -> Option<Decimal> {
    let Some(value) = value else {
        if required {
            errors.add("price", REQUIRED);
        }
        return None;
    };

    let raw = match value {
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.trim().to_string(),
        _ => String::new(),
    };
    let Ok(price) = Decimal::from_str(&raw).or_else(|_| Decimal::from_scientific(&raw)) else {
        errors.add("price", "A valid number is required.");
        return None;
    };

    let price = price.normalize();
    if price.is_sign_negative() && !price.is_zero() {
        errors.add("price", "Ensure this value is greater than or equal to 0.");
        return None;
    }
    if price.scale() > PRICE_DECIMAL_PLACES {
        errors.add(
            "price",
            format!("Ensure that there are no more than {} decimal places.", PRICE_DECIMAL_PLACES),
        );
        return None;
    }

    let whole = price.trunc().normalize();
    let whole_digits = if whole.is_zero() { 0 } else { whole.to_string().len() as u32 };
    let max_whole = PRICE_MAX_DIGITS - PRICE_DECIMAL_PLACES;
    if whole_digits > max_whole {
        errors.add(
            "price",
            format!("Ensure that there are no more than {} digits before the decimal point.", max_whole),
        );
        return None;
    }

    let mut price = price;
    price.rescale(PRICE_DECIMAL_PLACES);
    Some(price)
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RecipeListQuery {
    /// Comma separated tag ids
    pub tags: Option<String>,
}
