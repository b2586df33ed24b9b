//! Database schema and migrations for treestore.
//!
//! Migrations are applied in order; `schema_version` records how many ran.

/// Database migrations.
pub const MIGRATIONS: &[&str] = &[
    // v1: users and their access credentials
    r#"
CREATE TABLE users (
    id              INTEGER PRIMARY KEY AUTOINCREMENT,
    username        TEXT NOT NULL UNIQUE,
    password_hash   TEXT NOT NULL,           -- opaque verifier, never interpreted here
    created_at      TEXT NOT NULL DEFAULT (datetime('now'))
);

-- One live credential per user.
CREATE TABLE credentials (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id     INTEGER NOT NULL UNIQUE REFERENCES users(id) ON DELETE CASCADE,
    token       TEXT NOT NULL UNIQUE,
    created_at  TEXT NOT NULL DEFAULT (datetime('now'))
);
"#,
    // v2: per-user folder trees
    r#"
CREATE TABLE folders (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id     INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    parent_id   INTEGER REFERENCES folders(id) ON DELETE CASCADE,
    name        TEXT NOT NULL,
    created_at  TEXT NOT NULL DEFAULT (datetime('now'))
);

-- Exactly one root per user.
CREATE UNIQUE INDEX idx_folders_single_root ON folders(user_id) WHERE parent_id IS NULL;
CREATE UNIQUE INDEX idx_folders_sibling_name ON folders(user_id, parent_id, name);
CREATE INDEX idx_folders_parent_id ON folders(parent_id);
"#,
    // v3: file blobs
    r#"
CREATE TABLE files (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id     INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    folder_id   INTEGER NOT NULL REFERENCES folders(id) ON DELETE CASCADE,
    name        TEXT NOT NULL,
    content     BLOB NOT NULL,
    size        INTEGER NOT NULL,
    created_at  TEXT NOT NULL,
    UNIQUE(user_id, folder_id, name)
);

CREATE INDEX idx_files_folder_id ON files(folder_id);
"#,
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_migrations_are_valid_sql() {
        for migration in MIGRATIONS {
            assert!(!migration.trim().is_empty());
            assert!(migration.contains("CREATE TABLE") || migration.contains("CREATE INDEX"));
        }
    }

    #[test]
    fn test_folders_migration_has_single_root_index() {
        let folders = MIGRATIONS[1];
        assert!(folders.contains("CREATE TABLE folders"));
        assert!(folders.contains("WHERE parent_id IS NULL"));
    }

    #[test]
    fn test_files_migration_keys_on_folder_and_name() {
        let files = MIGRATIONS[2];
        assert!(files.contains("CREATE TABLE files"));
        assert!(files.contains("UNIQUE(user_id, folder_id, name)"));
    }
}
