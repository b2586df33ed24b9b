//! treestore - multi-tenant hierarchical file store.
//!
//! Each user owns an isolated folder tree rooted at an implicit root folder;
//! files are blobs attached to folders. Everything lives in SQLite.

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod file;
pub mod logging;
pub mod store;

pub use auth::{
    generate_credential, hash_password, verify_password, AccessLookup, CredentialOwner,
    CredentialStore, PasswordError,
};
pub use config::Config;
pub use db::{Database, UserAccess, UserId};
pub use error::{Result, StoreError};
pub use file::{
    FileId, FileMetadata, FileRepository, Folder, FolderId, FolderRepository, Item, NewFile,
    PathResolver, StoredFile,
};
pub use store::Store;
