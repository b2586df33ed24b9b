//! Storage facade consumed by the request-handling layer.
//!
//! `Store` owns the [`Database`] handle and hands out the component
//! repositories. Every operation runs under the store's deadline; expiry is
//! reported as [`StoreError::Timeout`](crate::StoreError::Timeout).

use std::time::Duration;

use crate::auth::{AccessLookup, CredentialOwner, CredentialStore};
use crate::config::{Config, StorageConfig};
use crate::db::{with_deadline, Database, UserAccess, UserId};
use crate::file::{
    FileId, FileMetadata, FileRepository, Folder, FolderId, FolderRepository, Item, NewFile,
    PathResolver, StoredFile,
};
use crate::Result;

/// Default deadline when no configuration is supplied.
pub const DEFAULT_DEADLINE: Duration = Duration::from_secs(10);

/// Multi-tenant folder/file store.
///
/// Cloning is cheap; clones share the database pool.
#[derive(Clone)]
pub struct Store {
    db: Database,
    storage: StorageConfig,
    deadline: Duration,
}

impl Store {
    /// Open the database described by `config`.
    pub async fn open(config: &Config) -> Result<Self> {
        let db = Database::open(&config.database).await?;
        Ok(Self::new(db, config.storage.clone()).with_deadline(config.database.operation_timeout()))
    }

    /// In-memory store with default limits.
    pub async fn open_in_memory() -> Result<Self> {
        let db = Database::open_in_memory().await?;
        Ok(Self::new(db, StorageConfig::default()))
    }

    /// Wrap an already opened database.
    pub fn new(db: Database, storage: StorageConfig) -> Self {
        Self {
            db,
            storage,
            deadline: DEFAULT_DEADLINE,
        }
    }

    /// Bound every subsequent operation by `deadline`.
    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = deadline;
        self
    }

    /// A handle on the same database whose operations run under `deadline`.
    ///
    /// Works through a shared reference, so a caller holding an `Arc<Store>`
    /// can bound a single request without affecting other callers.
    pub fn deadline_for(&self, deadline: Duration) -> Store {
        self.clone().with_deadline(deadline)
    }

    /// Deadline applied to each operation.
    pub fn deadline(&self) -> Duration {
        self.deadline
    }

    /// The underlying database handle.
    pub fn database(&self) -> &Database {
        &self.db
    }

    /// Close the underlying pool. Every handle sharing it becomes unavailable.
    pub async fn close(&self) {
        self.db.close().await;
    }

    fn folders(&self) -> FolderRepository<'_> {
        FolderRepository::new(self.db.pool()).with_root_name(&self.storage.root_folder_name)
    }

    fn files(&self) -> FileRepository<'_> {
        FileRepository::new(self.db.pool()).with_max_file_size(self.storage.max_file_size_bytes())
    }

    // Credential store

    /// Register `username` with an opaque password verifier; issues its credential.
    pub async fn create_user(&self, username: &str, password_verifier: &str) -> Result<UserId> {
        with_deadline(
            self.deadline,
            CredentialStore::new(&self.db).create_user(username, password_verifier),
        )
        .await
    }

    /// Whether `username` is registered.
    pub async fn username_exists(&self, username: &str) -> Result<bool> {
        with_deadline(
            self.deadline,
            CredentialStore::new(&self.db).username_exists(username),
        )
        .await
    }

    // Access lookup

    /// Resolve a user with its credential and root folder, provisioning the root if needed.
    pub async fn get_user_by_username(&self, username: &str) -> Result<UserAccess> {
        let lookup = AccessLookup::new(&self.db).with_root_name(&self.storage.root_folder_name);
        with_deadline(self.deadline, lookup.get_user_by_username(username)).await
    }

    /// Resolve the user a credential belongs to.
    pub async fn get_user_by_credential(&self, credential: &str) -> Result<CredentialOwner> {
        with_deadline(
            self.deadline,
            AccessLookup::new(&self.db).get_user_by_credential(credential),
        )
        .await
    }

    // Folder tree

    /// The user's root folder id, created on first access.
    pub async fn ensure_root(&self, user_id: UserId) -> Result<FolderId> {
        with_deadline(self.deadline, self.folders().ensure_root(user_id)).await
    }

    /// A folder owned by `user_id`.
    pub async fn get_folder(&self, user_id: UserId, folder_id: FolderId) -> Result<Folder> {
        with_deadline(self.deadline, self.folders().get(user_id, folder_id)).await
    }

    /// Immediate subfolders of `parent_id`, ordered by name.
    pub async fn list_child_folders(
        &self,
        user_id: UserId,
        parent_id: FolderId,
    ) -> Result<Vec<Folder>> {
        with_deadline(self.deadline, self.folders().list_children(user_id, parent_id)).await
    }

    /// Create a subfolder under `parent_id`.
    pub async fn create_folder(
        &self,
        user_id: UserId,
        parent_id: FolderId,
        name: &str,
    ) -> Result<Folder> {
        with_deadline(self.deadline, self.folders().create(user_id, parent_id, name)).await
    }

    /// Delete a non-root folder and everything below it.
    pub async fn delete_folder(&self, user_id: UserId, folder_id: FolderId) -> Result<()> {
        with_deadline(self.deadline, self.folders().delete(user_id, folder_id)).await
    }

    // Path resolver

    /// Slash-joined path from the root to `folder_id`.
    pub async fn resolve_path(&self, user_id: UserId, folder_id: FolderId) -> Result<String> {
        with_deadline(
            self.deadline,
            PathResolver::new(self.db.pool()).resolve_path(user_id, folder_id),
        )
        .await
    }

    /// Folders from the root down to `folder_id`.
    pub async fn breadcrumbs(&self, user_id: UserId, folder_id: FolderId) -> Result<Vec<Folder>> {
        with_deadline(
            self.deadline,
            PathResolver::new(self.db.pool()).breadcrumbs(user_id, folder_id),
        )
        .await
    }

    // Blob store

    /// Store a file, replacing one with the same name in the same folder.
    pub async fn save_file(&self, user_id: UserId, file: &NewFile) -> Result<FileMetadata> {
        with_deadline(self.deadline, self.files().save(user_id, file)).await
    }

    /// Metadata of the files in a folder, ordered by name.
    pub async fn list_files(&self, user_id: UserId, folder_id: FolderId) -> Result<Vec<FileMetadata>> {
        with_deadline(self.deadline, self.files().list(user_id, folder_id)).await
    }

    /// A file with its content.
    pub async fn get_file(&self, user_id: UserId, file_id: FileId) -> Result<StoredFile> {
        with_deadline(self.deadline, self.files().get(user_id, file_id)).await
    }

    /// Delete a file.
    pub async fn delete_file(&self, user_id: UserId, file_id: FileId) -> Result<()> {
        with_deadline(self.deadline, self.files().delete(user_id, file_id)).await
    }

    /// Subfolders then files of a folder owned by `user_id`.
    pub async fn list_items(&self, user_id: UserId, folder_id: FolderId) -> Result<Vec<Item>> {
        with_deadline(self.deadline, async {
            let folders = self.folders();
            folders.get(user_id, folder_id).await?;

            let children = folders.list_children(user_id, folder_id).await?;
            let files = self.files().list(user_id, folder_id).await?;

            let mut items = Vec::with_capacity(children.len() + files.len());
            items.extend(children.into_iter().map(Item::from));
            items.extend(files.into_iter().map(Item::from));
            Ok(items)
        })
        .await
    }
}
