//! Access credential repository.
//!
//! A credential is an opaque bearer token bound to exactly one user. It is
//! written in the same transaction as its user (see
//! [`UserRepository::create_with_credential`](super::UserRepository::create_with_credential)),
//! so this repository only reads.

use chrono::{DateTime, Utc};

use super::{DbPool, UserId};
use crate::{Result, StoreError};

/// Credential entity.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Credential {
    /// Credential ID.
    pub id: i64,
    /// Owning user.
    pub user_id: UserId,
    /// Token string.
    pub token: String,
    /// Issue timestamp.
    pub created_at: DateTime<Utc>,
}

/// Repository for credential lookups.
pub struct CredentialRepository<'a> {
    pool: &'a DbPool,
}

impl<'a> CredentialRepository<'a> {
    /// Create a new repository instance.
    pub fn new(pool: &'a DbPool) -> Self {
        Self { pool }
    }

    /// Find the credential with the given token.
    pub async fn get_by_token(&self, token: &str) -> Result<Credential> {
        sqlx::query_as::<_, Credential>(
            "SELECT id, user_id, token, created_at FROM credentials WHERE token = ?",
        )
        .bind(token)
        .fetch_optional(self.pool)
        .await?
        .ok_or(StoreError::NotFound("credential"))
    }

    /// Find the live credential of a user.
    pub async fn get_by_user(&self, user_id: UserId) -> Result<Credential> {
        sqlx::query_as::<_, Credential>(
            "SELECT id, user_id, token, created_at FROM credentials WHERE user_id = ?",
        )
        .bind(user_id)
        .fetch_optional(self.pool)
        .await?
        .ok_or(StoreError::NotFound("credential"))
    }
}
