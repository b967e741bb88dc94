use chrono::Utc;
use std::sync::Arc;

use crate::auth::password::{self, PasswordError, UNUSABLE_PASSWORD};
use crate::database::models::{NewUser, User};
use crate::database::{DatabaseError, Store};

#[derive(Debug, thiserror::Error)]
pub enum UserError {
    #[error("User must have an email address")]
    MissingEmail,
    #[error(transparent)]
    Password(#[from] PasswordError),
    #[error(transparent)]
    Database(#[from] DatabaseError),
}

/// Fields a user may change on their own profile; `None` keeps the current value
#[derive(Debug, Clone, Default)]
pub struct ProfileChanges {
    pub email: Option<String>,
    pub name: Option<String>,
    pub password: Option<String>,
}

/// Lowercase the domain part of an email address, leaving the local part as given
pub fn normalize_email(raw: &str) -> String {
    let email = raw.trim();
    match email.rsplit_once('@') {
        Some((local, domain)) => format!("{}@{}", local, domain.to_lowercase()),
        None => email.to_string(),
    }
}

/// Account creation, credential checks and profile updates
#[derive(Clone)]
pub struct UserService {
    store: Arc<dyn Store>,
}

impl UserService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Create a regular user. Without a password the account cannot log in.
    pub async fn create_user(
        &self,
        email: &str,
        password: Option<&str>,
        name: &str,
    ) -> Result<User, UserError> {
        self.insert(email, password, name, false).await
    }

    /// Create a user with staff and superuser rights
    pub async fn create_superuser(&self, email: &str, password: &str, name: &str) -> Result<User, UserError> {
        self.insert(email, Some(password), name, true).await
    }

    async fn insert(
        &self,
        email: &str,
        password: Option<&str>,
        name: &str,
        elevated: bool,
    ) -> Result<User, UserError> {
        if email.trim().is_empty() {
            return Err(UserError::MissingEmail);
        }

        let password_hash = match password {
            Some(raw) => password::hash_password(raw)?,
            None => UNUSABLE_PASSWORD.to_string(),
        };

        let user = self
            .store
            .insert_user(NewUser {
                email: normalize_email(email),
                name: name.to_string(),
                password_hash,
                is_staff: elevated,
                is_superuser: elevated,
            })
            .await?;

        tracing::info!(user_id = user.id, superuser = elevated, "Created user {}", user.email);
        Ok(user)
    }

    /// Return the user when the credentials match an active account
    pub async fn authenticate(&self, email: &str, password: &str) -> Result<Option<User>, UserError> {
        let email = normalize_email(email);
        let Some(user) = self.store.user_by_email(&email).await? else {
            tracing::debug!("Authentication failed: unknown email {}", email);
            return Ok(None);
        };

        if !user.is_active || !user.check_password(password) {
            tracing::debug!(user_id = user.id, "Authentication failed: inactive user or bad password");
            return Ok(None);
        }

        self.store.record_login(user.id, Utc::now()).await?;
        Ok(Some(user))
    }

    pub async fn update_profile(&self, mut user: User, changes: ProfileChanges) -> Result<User, UserError> {
        if let Some(email) = changes.email {
            if email.trim().is_empty() {
                return Err(UserError::MissingEmail);
            }
            user.email = normalize_email(&email);
        }
        if let Some(name) = changes.name {
            user.name = name;
        }
        if let Some(raw) = changes.password {
            user.password_hash = password::hash_password(&raw)?;
        }

        let updated = self.store.update_user(&user).await?;
        tracing::info!(user_id = updated.id, "Updated profile");
        Ok(updated)
    }
}
