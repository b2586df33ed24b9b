//! Path resolution from a user's root down to a folder.

use std::collections::HashSet;

use sqlx::{Executor, Sqlite};
use tracing::{debug, warn};

use super::folder::{Folder, FolderId};
use super::MAX_PATH_DEPTH;
use crate::db::{DbPool, UserId};
use crate::{Result, StoreError};

/// Fetch `folder_id` and its ancestors, root first.
///
/// The walk follows `parent_id` upward, only through folders owned by
/// `user_id`, and stops after `MAX_PATH_DEPTH` steps so a corrupted
/// parent chain still terminates. An empty result means the folder does
/// not exist for this user. The chain is returned unchecked.
pub(crate) async fn ancestors<'e, E>(
    executor: E,
    user_id: UserId,
    folder_id: FolderId,
) -> Result<Vec<Folder>>
where
    E: Executor<'e, Database = Sqlite>,
{
    let chain = sqlx::query_as::<_, Folder>(
        "WITH RECURSIVE chain(id, user_id, parent_id, name, created_at, depth) AS (
             SELECT id, user_id, parent_id, name, created_at, 0
             FROM folders WHERE id = ? AND user_id = ?
             UNION ALL
             SELECT f.id, f.user_id, f.parent_id, f.name, f.created_at, c.depth + 1
             FROM folders f JOIN chain c ON f.id = c.parent_id
             WHERE f.user_id = ? AND c.depth < ?
         )
         SELECT id, user_id, parent_id, name, created_at FROM chain ORDER BY depth DESC",
    )
    .bind(folder_id)
    .bind(user_id)
    .bind(user_id)
    .bind(MAX_PATH_DEPTH as i64)
    .fetch_all(executor)
    .await?;
    Ok(chain)
}

/// Check that a root-first chain is a well-formed path.
fn verify_chain(chain: &[Folder]) -> Result<()> {
    let mut seen = HashSet::with_capacity(chain.len());
    if chain.iter().any(|f| !seen.insert(f.id)) {
        return Err(StoreError::InvalidState(
            "cycle detected in folder tree".to_string(),
        ));
    }

    match chain.first() {
        Some(top) if top.is_root() => {}
        Some(top) => {
            return Err(StoreError::InvalidState(format!(
                "folder {} does not lead back to a root",
                top.id
            )))
        }
        None => return Err(StoreError::NotFound("folder")),
    }

    let linked = chain
        .windows(2)
        .all(|pair| pair[1].parent_id == Some(pair[0].id));
    if !linked {
        return Err(StoreError::InvalidState(
            "folder chain is not contiguous".to_string(),
        ));
    }
    Ok(())
}

/// Resolves breadcrumb paths within one user's tree.
pub struct PathResolver<'a> {
    pool: &'a DbPool,
}

impl<'a> PathResolver<'a> {
    /// Create a new PathResolver with the given database pool reference.
    pub fn new(pool: &'a DbPool) -> Self {
        Self { pool }
    }

    /// Folders from the root down to `folder_id`, inclusive.
    pub async fn breadcrumbs(&self, user_id: UserId, folder_id: FolderId) -> Result<Vec<Folder>> {
        let chain = ancestors(self.pool, user_id, folder_id).await?;
        if let Err(e) = verify_chain(&chain) {
            if !e.is_not_found() {
                warn!(user_id, folder_id, error = %e, "Corrupt folder chain");
            }
            return Err(e);
        }
        Ok(chain)
    }

    /// Slash-joined folder names from the root to `folder_id`, e.g. `root/docs/2024`.
    pub async fn resolve_path(&self, user_id: UserId, folder_id: FolderId) -> Result<String> {
        let chain = self.breadcrumbs(user_id, folder_id).await?;
        let path = chain
            .iter()
            .map(|f| f.name.as_str())
            .collect::<Vec<_>>()
            .join("/");
        debug!(user_id, folder_id, path = %path, "Resolved folder path");
        Ok(path)
    }
}
