//! Per-user folder trees and file blobs.
//!
//! - [`FolderRepository`]: root provisioning, child listing, folder create/delete
//! - [`PathResolver`]: slash-joined path and breadcrumbs from the root
//! - [`FileRepository`]: insert-or-replace blobs scoped to (user, folder)
//! - [`Item`]: folder or file row in a directory listing
//!
//! Every query is scoped by user id; rows owned by someone else look absent.

mod folder;
mod item;
mod metadata;
mod path;

pub use folder::{Folder, FolderId, FolderRepository};
pub use item::Item;
pub use metadata::{FileId, FileMetadata, FileRepository, NewFile, StoredFile};
pub use path::PathResolver;

use crate::{Result, StoreError};

/// Name given to a freshly provisioned root folder.
pub const DEFAULT_ROOT_NAME: &str = "root";

/// Maximum length for folder and file names (in characters).
pub const MAX_NAME_LENGTH: usize = 255;

/// Maximum number of folders on a root-to-leaf chain.
pub const MAX_PATH_DEPTH: usize = 256;

/// Validate a folder or file name.
///
/// Names are single path segments: non-empty, no `/`, no control
/// characters, not `.` or `..`.
pub fn validate_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(StoreError::Validation("name must not be empty".to_string()));
    }
    if name.chars().count() > MAX_NAME_LENGTH {
        return Err(StoreError::Validation(format!(
            "name must be at most {MAX_NAME_LENGTH} characters"
        )));
    }
    if name == "." || name == ".." {
        return Err(StoreError::Validation(format!("'{name}' is reserved")));
    }
    if name.contains('/') || name.chars().any(char::is_control) {
        return Err(StoreError::Validation(
            "name must not contain '/' or control characters".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_name_accepts() {
        assert!(validate_name("notes.txt").is_ok());
        assert!(validate_name("2024").is_ok());
        assert!(validate_name("共有ファイル").is_ok());
        assert!(validate_name(&"a".repeat(MAX_NAME_LENGTH)).is_ok());
    }

    #[test]
    fn test_validate_name_rejects() {
        for bad in ["", "   ", ".", "..", "a/b", "tab\there"] {
            assert!(
                matches!(validate_name(bad), Err(StoreError::Validation(_))),
                "{bad:?} accepted"
            );
        }
        assert!(validate_name(&"a".repeat(MAX_NAME_LENGTH + 1)).is_err());
    }
}
