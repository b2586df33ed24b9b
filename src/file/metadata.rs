//! File blobs and their metadata.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info, warn};

use super::folder::FolderId;
use super::validate_name;
use crate::db::{begin_write, DbPool, UserId};
use crate::{Result, StoreError};

/// Identifier of a file row.
pub type FileId = i64;

/// Listing view of a file; never carries the content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct FileMetadata {
    /// Unique file ID.
    pub id: FileId,
    /// Folder the file lives in.
    pub folder_id: FolderId,
    /// File name, unique within its folder.
    pub name: String,
    /// Size in bytes.
    pub size: i64,
    /// Caller-supplied creation time.
    pub created_at: DateTime<Utc>,
}

/// A file with its content.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct StoredFile {
    /// Unique file ID.
    pub id: FileId,
    /// Folder the file lives in.
    pub folder_id: FolderId,
    /// File name.
    pub name: String,
    /// Raw bytes.
    pub content: Vec<u8>,
    /// Size in bytes, always `content.len()`.
    pub size: i64,
    /// Caller-supplied creation time.
    pub created_at: DateTime<Utc>,
}

impl StoredFile {
    /// Metadata without the content.
    pub fn metadata(&self) -> FileMetadata {
        FileMetadata {
            id: self.id,
            folder_id: self.folder_id,
            name: self.name.clone(),
            size: self.size,
            created_at: self.created_at,
        }
    }
}

/// Data for writing a file.
#[derive(Debug, Clone)]
pub struct NewFile {
    /// Target folder.
    pub folder_id: FolderId,
    /// File name.
    pub name: String,
    /// File content.
    pub content: Vec<u8>,
    /// Declared size; must equal `content.len()`.
    pub size: i64,
    /// Creation time recorded with the file.
    pub created_at: DateTime<Utc>,
}

impl NewFile {
    /// Create a NewFile whose size is taken from the content and stamped now.
    pub fn new(folder_id: FolderId, name: impl Into<String>, content: Vec<u8>) -> Self {
        let size = content.len() as i64;
        Self {
            folder_id,
            name: name.into(),
            content,
            size,
            created_at: Utc::now(),
        }
    }

    /// Override the declared size.
    pub fn with_size(mut self, size: i64) -> Self {
        self.size = size;
        self
    }

    /// Set the creation time.
    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = created_at;
        self
    }
}

/// Repository for file blobs.
pub struct FileRepository<'a> {
    pool: &'a DbPool,
    max_file_size: Option<u64>,
}

impl<'a> FileRepository<'a> {
    /// Create a new FileRepository with the given database pool reference.
    pub fn new(pool: &'a DbPool) -> Self {
        Self {
            pool,
            max_file_size: None,
        }
    }

    /// Reject content larger than `max_bytes`.
    pub fn with_max_file_size(mut self, max_bytes: u64) -> Self {
        self.max_file_size = Some(max_bytes);
        self
    }

    fn validate(&self, file: &NewFile) -> Result<()> {
        validate_name(&file.name)?;
        if file.size != file.content.len() as i64 {
            return Err(StoreError::Validation(format!(
                "declared size {} does not match content length {}",
                file.size,
                file.content.len()
            )));
        }
        if let Some(max) = self.max_file_size {
            if file.content.len() as u64 > max {
                return Err(StoreError::Validation(format!(
                    "file exceeds the maximum size of {max} bytes"
                )));
            }
        }
        Ok(())
    }

    /// Insert a file, or fully replace the one with the same name in the same folder.
    ///
    /// The folder must belong to `user_id`; the ownership check and the write
    /// share one transaction. A replaced file keeps its id.
    pub async fn save(&self, user_id: UserId, file: &NewFile) -> Result<FileMetadata> {
        self.validate(file)?;

        let mut tx = begin_write(self.pool).await?;

        let owns_folder: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM folders WHERE id = ? AND user_id = ?)")
                .bind(file.folder_id)
                .bind(user_id)
                .fetch_one(&mut *tx)
                .await?;
        if !owns_folder {
            warn!(user_id, folder_id = file.folder_id, "Upload to a folder the user does not own");
            return Err(StoreError::NotFound("folder"));
        }

        let saved = sqlx::query_as::<_, FileMetadata>(
            "INSERT INTO files (user_id, folder_id, name, content, size, created_at)
             VALUES (?, ?, ?, ?, ?, ?)
             ON CONFLICT (user_id, folder_id, name) DO UPDATE SET
                 content = excluded.content,
                 size = excluded.size,
                 created_at = excluded.created_at
             RETURNING id, folder_id, name, size, created_at",
        )
        .bind(user_id)
        .bind(file.folder_id)
        .bind(&file.name)
        .bind(&file.content)
        .bind(file.size)
        .bind(file.created_at)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        info!(
            user_id,
            file_id = saved.id,
            folder_id = saved.folder_id,
            size = saved.size,
            "Saved file"
        );
        Ok(saved)
    }

    /// List files in a folder, without content.
    pub async fn list(&self, user_id: UserId, folder_id: FolderId) -> Result<Vec<FileMetadata>> {
        debug!(user_id, folder_id, "Listing files");
        let files = sqlx::query_as::<_, FileMetadata>(
            "SELECT id, folder_id, name, size, created_at
             FROM files WHERE user_id = ? AND folder_id = ? ORDER BY name, id",
        )
        .bind(user_id)
        .bind(folder_id)
        .fetch_all(self.pool)
        .await?;
        Ok(files)
    }

    /// Get a file with its content.
    pub async fn get(&self, user_id: UserId, id: FileId) -> Result<StoredFile> {
        sqlx::query_as::<_, StoredFile>(
            "SELECT id, folder_id, name, content, size, created_at
             FROM files WHERE id = ? AND user_id = ?",
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(self.pool)
        .await?
        .ok_or(StoreError::NotFound("file"))
    }

    /// Delete a file.
    pub async fn delete(&self, user_id: UserId, id: FileId) -> Result<()> {
        let result = sqlx::query("DELETE FROM files WHERE id = ? AND user_id = ?")
            .bind(id)
            .bind(user_id)
            .execute(self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound("file"));
        }
        info!(user_id, file_id = id, "Deleted file");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{Database, NewUser, UserRepository};
    use crate::file::FolderRepository;
    use chrono::TimeZone;

    async fn setup() -> (Database, UserId, FolderId) {
        let db = Database::open_in_memory().await.unwrap();
        let user = UserRepository::new(db.pool())
            .create_with_credential(&NewUser::new("alice", "hash"), "tok")
            .await
            .unwrap()
            .0
            .id;
        let root = FolderRepository::new(db.pool())
            .ensure_root(user)
            .await
            .unwrap();
        (db, user, root)
    }

    #[tokio::test]
    async fn test_save_and_get() {
        let (db, user, root) = setup().await;
        let repo = FileRepository::new(db.pool());
        let t0 = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();

        let saved = repo
            .save(user, &NewFile::new(root, "notes.txt", b"hi".to_vec()).with_created_at(t0))
            .await
            .unwrap();
        assert_eq!(saved.size, 2);
        assert_eq!(saved.created_at, t0);

        let file = repo.get(user, saved.id).await.unwrap();
        assert_eq!(file.name, "notes.txt");
        assert_eq!(file.content, b"hi");
        assert_eq!(file.size, 2);
        assert_eq!(file.metadata(), saved);
    }

    #[tokio::test]
    async fn test_save_overwrites_same_name() {
        let (db, user, root) = setup().await;
        let repo = FileRepository::new(db.pool());

        let first = repo
            .save(user, &NewFile::new(root, "a.txt", b"first".to_vec()))
            .await
            .unwrap();
        let second = repo
            .save(user, &NewFile::new(root, "a.txt", b"second!".to_vec()))
            .await
            .unwrap();
        assert_eq!(first.id, second.id);

        let listed = repo.list(user, root).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].size, 7);

        let file = repo.get(user, first.id).await.unwrap();
        assert_eq!(file.content, b"second!");
    }

    #[tokio::test]
    async fn test_save_rejects_size_mismatch() {
        let (db, user, root) = setup().await;
        let repo = FileRepository::new(db.pool());

        let err = repo
            .save(user, &NewFile::new(root, "a.txt", b"abc".to_vec()).with_size(10))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Validation(_)));
    }

    #[tokio::test]
    async fn test_save_rejects_oversized() {
        let (db, user, root) = setup().await;
        let repo = FileRepository::new(db.pool()).with_max_file_size(4);

        let err = repo
            .save(user, &NewFile::new(root, "big.bin", vec![0u8; 5]))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Validation(_)));
        assert!(repo.list(user, root).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_save_into_foreign_folder_is_not_found() {
        let (db, alice, alice_root) = setup().await;
        let bob = UserRepository::new(db.pool())
            .create_with_credential(&NewUser::new("bob", "hash"), "tok-bob")
            .await
            .unwrap()
            .0
            .id;
        let repo = FileRepository::new(db.pool());

        let err = repo
            .save(bob, &NewFile::new(alice_root, "x.txt", b"x".to_vec()))
            .await
            .unwrap_err();
        assert!(err.is_not_found());
        assert!(repo.list(alice, alice_root).await.unwrap().is_empty());
        assert!(repo.list(bob, alice_root).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_get_foreign_file_is_not_found() {
        let (db, alice, root) = setup().await;
        let bob = UserRepository::new(db.pool())
            .create_with_credential(&NewUser::new("bob", "hash"), "tok-bob")
            .await
            .unwrap()
            .0
            .id;
        let repo = FileRepository::new(db.pool());
        let saved = repo
            .save(alice, &NewFile::new(root, "secret", b"s".to_vec()))
            .await
            .unwrap();

        assert!(repo.get(bob, saved.id).await.unwrap_err().is_not_found());
        assert!(repo.get(alice, 9999).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_empty_file_roundtrip() {
        let (db, user, root) = setup().await;
        let repo = FileRepository::new(db.pool());

        let saved = repo
            .save(user, &NewFile::new(root, "empty", Vec::new()))
            .await
            .unwrap();
        let file = repo.get(user, saved.id).await.unwrap();
        assert!(file.content.is_empty());
        assert_eq!(file.size, 0);
    }

    #[tokio::test]
    async fn test_delete() {
        let (db, user, root) = setup().await;
        let repo = FileRepository::new(db.pool());
        let saved = repo
            .save(user, &NewFile::new(root, "a", b"a".to_vec()))
            .await
            .unwrap();

        repo.delete(user, saved.id).await.unwrap();
        assert!(repo.get(user, saved.id).await.unwrap_err().is_not_found());
        assert!(repo.delete(user, saved.id).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_files_removed_with_folder() {
        let (db, user, root) = setup().await;
        let folders = FolderRepository::new(db.pool());
        let docs = folders.create(user, root, "docs").await.unwrap();
        let repo = FileRepository::new(db.pool());
        let saved = repo
            .save(user, &NewFile::new(docs.id, "a", b"a".to_vec()))
            .await
            .unwrap();

        folders.delete(user, docs.id).await.unwrap();
        assert!(repo.get(user, saved.id).await.unwrap_err().is_not_found());
    }
}
