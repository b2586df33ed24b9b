//! User registration: a user and its access credential are created together.

use tracing::info;

use super::credential::generate_credential;
use crate::db::{Database, NewUser, UserId, UserRepository};
use crate::{Result, StoreError};

/// Maximum username length (in characters).
pub const MAX_USERNAME_LENGTH: usize = 64;

/// Check a username before it reaches the database.
pub fn validate_username(username: &str) -> Result<()> {
    if username.trim().is_empty() {
        return Err(StoreError::Validation("username must not be empty".to_string()));
    }
    if username.trim() != username {
        return Err(StoreError::Validation(
            "username must not start or end with whitespace".to_string(),
        ));
    }
    if username.chars().count() > MAX_USERNAME_LENGTH {
        return Err(StoreError::Validation(format!(
            "username must be at most {MAX_USERNAME_LENGTH} characters"
        )));
    }
    if username.chars().any(char::is_control) {
        return Err(StoreError::Validation(
            "username must not contain control characters".to_string(),
        ));
    }
    Ok(())
}

/// Issues identities and their credentials.
pub struct CredentialStore<'a> {
    db: &'a Database,
}

impl<'a> CredentialStore<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// Create a user with `password_verifier` and bind a fresh credential to it.
    ///
    /// All-or-nothing: a user never exists without its credential. A taken
    /// username is [`StoreError::Conflict`].
    pub async fn create_user(&self, username: &str, password_verifier: &str) -> Result<UserId> {
        validate_username(username)?;

        let credential = generate_credential();
        let (user, _) = UserRepository::new(self.db.pool())
            .create_with_credential(&NewUser::new(username, password_verifier), &credential)
            .await?;

        info!(user_id = user.id, username = %user.username, "Registered user");
        Ok(user.id)
    }

    /// Whether `username` is already registered.
    pub async fn username_exists(&self, username: &str) -> Result<bool> {
        UserRepository::new(self.db.pool())
            .username_exists(username)
            .await
    }
}
