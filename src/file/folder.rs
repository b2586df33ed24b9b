//! Folder types and repository for treestore.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info, warn};

use super::path::ancestors;
use super::{validate_name, DEFAULT_ROOT_NAME, MAX_PATH_DEPTH};
use crate::db::{begin_write, DbPool, UserId};
use crate::{Result, StoreError};

/// Identifier of a folder row.
pub type FolderId = i64;

/// A node in a user's folder tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct Folder {
    /// Unique folder ID.
    pub id: FolderId,
    /// Owning user.
    pub user_id: UserId,
    /// Parent folder ID (None only for the user's root).
    pub parent_id: Option<FolderId>,
    /// Folder name.
    pub name: String,
    /// When the folder was created.
    pub created_at: DateTime<Utc>,
}

impl Folder {
    /// Whether this is the user's root folder.
    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }
}

/// Repository for folder operations.
pub struct FolderRepository<'a> {
    pool: &'a DbPool,
    root_name: &'a str,
}

impl<'a> FolderRepository<'a> {
    /// Create a new FolderRepository with the given database pool reference.
    pub fn new(pool: &'a DbPool) -> Self {
        Self {
            pool,
            root_name: DEFAULT_ROOT_NAME,
        }
    }

    /// Name used when provisioning a root folder.
    pub fn with_root_name(mut self, root_name: &'a str) -> Self {
        self.root_name = root_name;
        self
    }

    /// Return the user's root folder id, creating the root on first access.
    ///
    /// The insert is a single upsert against the one-root-per-user index, so
    /// concurrent first accesses all observe the same root.
    pub async fn ensure_root(&self, user_id: UserId) -> Result<FolderId> {
        let inserted = sqlx::query(
            "INSERT INTO folders (user_id, parent_id, name, created_at) VALUES (?, NULL, ?, ?)
             ON CONFLICT (user_id) WHERE parent_id IS NULL DO NOTHING",
        )
        .bind(user_id)
        .bind(self.root_name)
        .bind(Utc::now())
        .execute(self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db) if db.is_foreign_key_violation() => {
                StoreError::NotFound("user")
            }
            other => other.into(),
        })?;

        if inserted.rows_affected() > 0 {
            info!(user_id, "Provisioned root folder");
        }

        self.root(user_id).await?.map(|f| f.id).ok_or_else(|| {
            StoreError::InvalidState(format!("user {user_id} has no root folder after provisioning"))
        })
    }

    /// Get the user's root folder without creating it.
    pub async fn root(&self, user_id: UserId) -> Result<Option<Folder>> {
        let folder = sqlx::query_as::<_, Folder>(
            "SELECT id, user_id, parent_id, name, created_at
             FROM folders WHERE user_id = ? AND parent_id IS NULL",
        )
        .bind(user_id)
        .fetch_optional(self.pool)
        .await?;
        Ok(folder)
    }

    /// Get a folder owned by `user_id`.
    pub async fn get(&self, user_id: UserId, id: FolderId) -> Result<Folder> {
        sqlx::query_as::<_, Folder>(
            "SELECT id, user_id, parent_id, name, created_at
             FROM folders WHERE id = ? AND user_id = ?",
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(self.pool)
        .await?
        .ok_or(StoreError::NotFound("folder"))
    }

    /// List the immediate children of a folder. A leaf yields an empty list.
    pub async fn list_children(&self, user_id: UserId, parent_id: FolderId) -> Result<Vec<Folder>> {
        debug!(user_id, parent_id, "Listing child folders");
        let folders = sqlx::query_as::<_, Folder>(
            "SELECT id, user_id, parent_id, name, created_at
             FROM folders WHERE user_id = ? AND parent_id = ? ORDER BY name, id",
        )
        .bind(user_id)
        .bind(parent_id)
        .fetch_all(self.pool)
        .await?;
        Ok(folders)
    }

    /// Create a subfolder under `parent_id`.
    ///
    /// The parent must belong to `user_id`. Since the parent already exists,
    /// a new folder can never become its own ancestor.
    pub async fn create(&self, user_id: UserId, parent_id: FolderId, name: &str) -> Result<Folder> {
        validate_name(name)?;

        let mut tx = begin_write(self.pool).await?;

        let chain = ancestors(&mut *tx, user_id, parent_id).await?;
        if chain.is_empty() {
            return Err(StoreError::NotFound("folder"));
        }
        if chain.len() >= MAX_PATH_DEPTH {
            return Err(StoreError::Validation(format!(
                "folders may be nested at most {MAX_PATH_DEPTH} levels deep"
            )));
        }

        let folder = sqlx::query_as::<_, Folder>(
            "INSERT INTO folders (user_id, parent_id, name, created_at) VALUES (?, ?, ?, ?)
             RETURNING id, user_id, parent_id, name, created_at",
        )
        .bind(user_id)
        .bind(parent_id)
        .bind(name)
        .bind(Utc::now())
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| match StoreError::from(e) {
            StoreError::Conflict(_) => {
                StoreError::Conflict(format!("a folder named '{name}' already exists here"))
            }
            other => other,
        })?;

        tx.commit().await?;
        info!(user_id, folder_id = folder.id, parent_id, "Created folder");
        Ok(folder)
    }

    /// Delete a folder together with its subfolders and their files.
    ///
    /// The root cannot be deleted.
    pub async fn delete(&self, user_id: UserId, id: FolderId) -> Result<()> {
        let folder = self.get(user_id, id).await?;
        if folder.is_root() {
            warn!(user_id, folder_id = id, "Refusing to delete root folder");
            return Err(StoreError::InvalidState(
                "the root folder cannot be deleted".to_string(),
            ));
        }

        let result = sqlx::query("DELETE FROM folders WHERE id = ? AND user_id = ?")
            .bind(id)
            .bind(user_id)
            .execute(self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound("folder"));
        }

        info!(user_id, folder_id = id, "Deleted folder");
        Ok(())
    }
}
