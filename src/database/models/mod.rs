pub mod recipe;
pub mod tag;
pub mod user;

pub use recipe::{NewRecipe, Recipe, RecipeChanges, RecipeFilter};
pub use tag::Tag;
pub use user::{NewUser, User};
