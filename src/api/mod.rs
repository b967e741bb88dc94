//! Request and response shapes for the REST surface, with field validation.
//!
//! Incoming payloads deserialize with every field optional so that missing
//! fields are reported per field instead of as a body rejection.

use std::collections::HashMap;

use crate::error::ApiError;

pub mod recipe;
pub mod tag;
pub mod user;

pub const REQUIRED: &str = "This field is required.";
pub const BLANK: &str = "This field may not be blank.";

/// Accumulates validation messages keyed by field name
#[derive(Debug, Default)]
pub struct FieldErrors(HashMap<String, String>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        // first message per field wins
        self.0.entry(field.to_string()).or_insert_with(|| message.into());
    }

    /// `Ok(value)` when nothing was recorded
    pub fn finish<T>(self, value: T) -> Result<T, ApiError> {
        if self.0.is_empty() {
            Ok(value)
        } else {
            Err(self.into_error())
        }
    }

    pub fn into_error(self) -> ApiError {
        ApiError::validation_error("Invalid input", Some(self.0))
    }

    /// Validate a text field, returning it with surrounding whitespace removed.
    /// Missing values are an error when `required`.
    pub fn text(
        &mut self,
        field: &str,
        value: Option<&str>,
        required: bool,
        allow_blank: bool,
        max_length: usize,
    ) -> Option<String> {
        let Some(value) = value else {
            if required {
                self.add(field, REQUIRED);
            }
            return None;
        };
        let value = value.trim();

        if !allow_blank && value.is_empty() {
            self.add(field, BLANK);
            return None;
        }
        if value.chars().count() > max_length {
            self.add(
                field,
                format!("Ensure this field has no more than {} characters.", max_length),
            );
            return None;
        }
        Some(value.to_string())
    }
}

/// Loose address check: one `@`, non-empty local part, dotted domain, no whitespace
pub fn is_valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.rsplit_once('@') else {
        return false;
    };
    !local.is_empty()
        && !local.contains('@')
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !domain.contains("..")
}

/// Interpret query flags such as `assigned_only=1`
pub fn parse_flag(value: Option<&str>) -> Result<bool, ()> {
    match value.map(str::trim) {
        None | Some("") => Ok(false),
        Some("1") | Some("true") | Some("True") => Ok(true),
        Some("0") | Some("false") | Some("False") => Ok(false),
        Some(_) => Err(()),
    }
}

/// Parse a comma separated id list such as `tags=1,2`
pub fn parse_id_list(value: Option<&str>) -> Result<Vec<i64>, String> {
    let Some(value) = value else {
        return Ok(vec![]);
    };
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| s.parse::<i64>().map_err(|_| format!("'{}' is not a valid id.", s)))
        .collect()
}
