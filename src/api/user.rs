use serde::{Deserialize, Serialize};

use super::{is_valid_email, FieldErrors, BLANK, REQUIRED};
use crate::database::models::user::{EMAIL_MAX_LENGTH, NAME_MAX_LENGTH};
use crate::auth::password::MAX_PASSWORD_BYTES;
use crate::database::models::User;
use crate::error::ApiError;
use crate::services::user_service::ProfileChanges;

/// Public view of an account; the password is write-only and never included
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserView {
    pub email: String,
    pub name: String,
}

impl From<&User> for UserView {
    fn from(user: &User) -> Self {
        Self {
            email: user.email.clone(),
            name: user.name.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserPayload {
    pub email: Option<String>,
    pub password: Option<String>,
    pub name: Option<String>,
}

/// Registration input after validation
#[derive(Debug, Clone)]
pub struct Registration {
    pub email: String,
    pub password: String,
    pub name: String,
}

impl UserPayload {
    /// All fields present and valid, as required on create and full update
    pub fn validate_full(&self, password_min_length: usize) -> Result<Registration, ApiError> {
        let mut errors = FieldErrors::new();
        let email = validate_email(&mut errors, self.email.as_deref(), true);
        let password = validate_password(&mut errors, self.password.as_deref(), true, password_min_length);
        let name = errors.text("name", self.name.as_deref(), true, false, NAME_MAX_LENGTH);

        match (email, password, name) {
            (Some(email), Some(password), Some(name)) => errors.finish(Registration { email, password, name }),
            _ => Err(errors.into_error()),
        }
    }

    /// Only the supplied fields are validated and changed
    pub fn validate_partial(&self, password_min_length: usize) -> Result<ProfileChanges, ApiError> {
        let mut errors = FieldErrors::new();
        let changes = ProfileChanges {
            email: validate_email(&mut errors, self.email.as_deref(), false),
            password: validate_password(&mut errors, self.password.as_deref(), false, password_min_length),
            name: errors.text("name", self.name.as_deref(), false, false, NAME_MAX_LENGTH),
        };
        errors.finish(changes)
    }
}

impl From<Registration> for ProfileChanges {
    fn from(registration: Registration) -> Self {
        Self {
            email: Some(registration.email),
            name: Some(registration.name),
            password: Some(registration.password),
        }
    }
}

fn validate_email(errors: &mut FieldErrors, value: Option<&str>, required: bool) -> Option<String> {
    let email = errors.text("email", value, required, false, EMAIL_MAX_LENGTH)?;
    if !is_valid_email(&email) {
        errors.add("email", "Enter a valid email address.");
        return None;
    }
    Some(email)
}

fn validate_password(
    errors: &mut FieldErrors,
    value: Option<&str>,
    required: bool,
    min_length: usize,
) -> Option<String> {
    let Some(password) = value else {
        if required {
            errors.add("password", REQUIRED);
        }
        return None;
    };
    if password.is_empty() {
        errors.add("password", BLANK);
        return None;
    }
    if password.chars().count() < min_length {
        errors.add(
            "password",
            format!("Ensure this field has at least {} characters.", min_length),
        );
        return None;
    }
    if password.len() > MAX_PASSWORD_BYTES {
        errors.add(
            "password",
            format!("Ensure this field has no more than {} characters.", MAX_PASSWORD_BYTES),
        );
        return None;
    }
    Some(password.to_string())
}

/// Credentials exchanged for a token. The password is not trimmed.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TokenRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl TokenRequest {
    pub fn validate(&self) -> Result<Credentials, ApiError> {
        let mut errors = FieldErrors::new();
        let email = validate_email(&mut errors, self.email.as_deref(), true);
        let password = match self.password.as_deref() {
            None => {
                errors.add("password", REQUIRED);
                None
            }
            Some("") => {
                errors.add("password", BLANK);
                None
            }
            Some(p) => Some(p.to_string()),
        };

        match (email, password) {
            (Some(email), Some(password)) => errors.finish(Credentials { email, password }),
            _ => Err(errors.into_error()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenView {
    pub token: String,
}
