//! Uniform directory-listing entries.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::folder::Folder;
use super::metadata::FileMetadata;

/// One entry of a folder listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Item {
    Folder(Folder),
    File(FileMetadata),
}

impl Item {
    pub fn id(&self) -> i64 {
        match self {
            Item::Folder(f) => f.id,
            Item::File(f) => f.id,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Item::Folder(f) => &f.name,
            Item::File(f) => &f.name,
        }
    }

    /// Size in bytes; folders report 0.
    pub fn size(&self) -> i64 {
        match self {
            Item::Folder(_) => 0,
            Item::File(f) => f.size,
        }
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        match self {
            Item::Folder(f) => f.created_at,
            Item::File(f) => f.created_at,
        }
    }

    pub fn is_container(&self) -> bool {
        matches!(self, Item::Folder(_))
    }
}

impl From<Folder> for Item {
    fn from(folder: Folder) -> Self {
        Item::Folder(folder)
    }
}

impl From<FileMetadata> for Item {
    fn from(file: FileMetadata) -> Self {
        Item::File(file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn when() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap()
    }

    #[test]
    fn test_folder_projection() {
        let item = Item::from(Folder {
            id: 3,
            user_id: 1,
            parent_id: Some(1),
            name: "docs".to_string(),
            created_at: when(),
        });

        assert_eq!(item.id(), 3);
        assert_eq!(item.name(), "docs");
        assert_eq!(item.size(), 0);
        assert_eq!(item.created_at(), when());
        assert!(item.is_container());
    }

    #[test]
    fn test_file_projection() {
        let item = Item::from(FileMetadata {
            id: 9,
            folder_id: 3,
            name: "notes.txt".to_string(),
            size: 2,
            created_at: when(),
        });

        assert_eq!(item.id(), 9);
        assert_eq!(item.name(), "notes.txt");
        assert_eq!(item.size(), 2);
        assert!(!item.is_container());
    }

    #[test]
    fn test_serializes_with_kind_tag() {
        let item = Item::from(FileMetadata {
            id: 9,
            folder_id: 3,
            name: "notes.txt".to_string(),
            size: 2,
            created_at: when(),
        });

        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json["kind"], "file");
        assert_eq!(json["name"], "notes.txt");
        assert_eq!(json["size"], 2);
    }
}
