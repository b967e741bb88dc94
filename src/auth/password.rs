use bcrypt::{hash, verify};

use crate::config;

/// Stored in place of a hash for accounts created without a password.
/// bcrypt hashes always start with `$`, so this can never verify.
pub const UNUSABLE_PASSWORD: &str = "!";

/// bcrypt ignores input past this many bytes
pub const MAX_PASSWORD_BYTES: usize = 72;

#[derive(Debug, thiserror::Error)]
pub enum PasswordError {
    #[error("Failed to hash password: {0}")]
    Hash(String),
    #[error("Password longer than 72 bytes")]
    TooLong,
}

/// Hash a password with the configured bcrypt cost
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    if password.len() > MAX_PASSWORD_BYTES {
        return Err(PasswordError::TooLong);
    }
    hash(password, config::config().security.bcrypt_cost)
        .map_err(|e| PasswordError::Hash(e.to_string()))
}

/// Check a raw password against a stored hash.
///
/// Malformed or unusable hashes simply fail verification.
pub fn verify_password(password: &str, password_hash: &str) -> bool {
    if !is_usable(password_hash) || password.len() > MAX_PASSWORD_BYTES {
        return false;
    }
    match verify(password, password_hash) {
        Ok(matches) => matches,
        Err(e) => {
            tracing::warn!("Password verification failed on stored hash: {}", e);
            false
        }
    }
}

pub fn is_usable(password_hash: &str) -> bool {
    !password_hash.is_empty() && !password_hash.starts_with(UNUSABLE_PASSWORD)
}
