use serde::{Deserialize, Serialize};
use sqlx::FromRow;

pub const TAG_NAME_MAX_LENGTH: usize = 255;

/// Label owned by a user and attached to any number of their recipes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Tag {
    pub id: i64,
    pub user_id: i64,
    pub name: String,
}

impl std::fmt::Display for Tag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.name)
    }
}
