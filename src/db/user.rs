//! User model for treestore.

use chrono::{DateTime, Utc};

/// Identifier of a user row.
pub type UserId = i64;

/// A registered user.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct User {
    /// Unique user ID.
    pub id: UserId,
    /// Unique username.
    pub username: String,
    /// Password verifier as produced by the caller (opaque to the store).
    pub password_hash: String,
    /// When the user was created.
    pub created_at: DateTime<Utc>,
}

/// Data for creating a new user.
#[derive(Debug, Clone)]
pub struct NewUser {
    /// Username (must be unique).
    pub username: String,
    /// Password verifier.
    pub password_hash: String,
}

impl NewUser {
    /// Create a new NewUser.
    pub fn new(username: impl Into<String>, password_hash: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password_hash: password_hash.into(),
        }
    }
}

/// Everything an authenticated session needs about a user, resolved by username.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserAccess {
    /// User ID.
    pub user_id: UserId,
    /// Username as registered.
    pub username: String,
    /// Stored password verifier, for the caller to check.
    pub password_hash: String,
    /// The user's live access credential.
    pub credential: String,
    /// Root folder, provisioned if it did not exist yet.
    pub root_folder_id: i64,
}
