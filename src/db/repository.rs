//! User repository for treestore.

use chrono::Utc;
use tracing::{debug, warn};

use super::user::{NewUser, User};
use super::{begin_write, DbPool};
use crate::{Result, StoreError};

/// Repository for user rows.
pub struct UserRepository<'a> {
    pool: &'a DbPool,
}

impl<'a> UserRepository<'a> {
    /// Create a new UserRepository with the given database pool reference.
    pub fn new(pool: &'a DbPool) -> Self {
        Self { pool }
    }

    /// Insert a user and bind `token` to it as one atomic unit.
    ///
    /// Either both rows are committed or neither is visible. A taken
    /// username surfaces as [`StoreError::Conflict`].
    pub async fn create_with_credential(
        &self,
        new_user: &NewUser,
        token: &str,
    ) -> Result<(User, String)> {
        let mut tx = begin_write(self.pool).await?;

        let user = sqlx::query_as::<_, User>(
            "INSERT INTO users (username, password_hash, created_at) VALUES (?, ?, ?)
             RETURNING id, username, password_hash, created_at",
        )
        .bind(&new_user.username)
        .bind(&new_user.password_hash)
        .bind(Utc::now())
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| match StoreError::from(e) {
            StoreError::Conflict(_) => {
                warn!(username = %new_user.username, "Username already taken");
                StoreError::Conflict("username already taken".to_string())
            }
            other => other,
        })?;

        sqlx::query("INSERT INTO credentials (user_id, token, created_at) VALUES (?, ?, ?)")
            .bind(user.id)
            .bind(token)
            .bind(Utc::now())
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok((user, token.to_string()))
    }

    /// Get a user by exact username.
    pub async fn get_by_username(&self, username: &str) -> Result<Option<User>> {
        debug!(username = %username, "Looking up user");
        let user = sqlx::query_as::<_, User>(
            "SELECT id, username, password_hash, created_at FROM users WHERE username = ?",
        )
        .bind(username)
        .fetch_optional(self.pool)
        .await?;
        Ok(user)
    }

    /// Whether a username is registered. Storage failures are returned, not folded into `false`.
    pub async fn username_exists(&self, username: &str) -> Result<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE username = ?)")
                .bind(username)
                .fetch_one(self.pool)
                .await?;
        Ok(exists)
    }
}
