use serde::{Deserialize, Serialize};

use super::FieldErrors;
use crate::database::models::tag::TAG_NAME_MAX_LENGTH;
use crate::database::models::Tag;
use crate::error::ApiError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagView {
    pub id: i64,
    pub name: String,
}

impl From<&Tag> for TagView {
    fn from(tag: &Tag) -> Self {
        Self {
            id: tag.id,
            name: tag.name.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TagPayload {
    pub name: Option<String>,
}

impl TagPayload {
    /// A rename always needs a name, for PUT and PATCH alike
    pub fn validate(&self) -> Result<String, ApiError> {
        let mut errors = FieldErrors::new();
        match errors.text("name", self.name.as_deref(), true, false, TAG_NAME_MAX_LENGTH) {
            Some(name) => errors.finish(name),
            None => Err(errors.into_error()),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TagListQuery {
    pub assigned_only: Option<String>,
}
