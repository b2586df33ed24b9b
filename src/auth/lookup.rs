//! Resolving a user from a username or an access credential.
//!
//! Neither lookup checks a password; the caller holds that policy.

use tracing::debug;

use super::credential::is_well_formed;
use crate::db::{CredentialRepository, Database, UserAccess, UserId, UserRepository};
use crate::file::{FolderRepository, DEFAULT_ROOT_NAME};
use crate::{Result, StoreError};

/// The user a credential is bound to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CredentialOwner {
    /// Owning user.
    pub user_id: UserId,
    /// The credential that was presented.
    pub credential: String,
}

/// User lookups for the authentication layer.
pub struct AccessLookup<'a> {
    db: &'a Database,
    root_name: &'a str,
}

impl<'a> AccessLookup<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self {
            db,
            root_name: DEFAULT_ROOT_NAME,
        }
    }

    /// Name used if the user's root folder has to be provisioned.
    pub fn with_root_name(mut self, root_name: &'a str) -> Self {
        self.root_name = root_name;
        self
    }

    /// Resolve a user, its credential and its root folder (provisioned on first access).
    pub async fn get_user_by_username(&self, username: &str) -> Result<UserAccess> {
        let user = UserRepository::new(self.db.pool())
            .get_by_username(username)
            .await?
            .ok_or(StoreError::NotFound("user"))?;

        let credential = CredentialRepository::new(self.db.pool())
            .get_by_user(user.id)
            .await
            .map_err(|e| match e {
                StoreError::NotFound(_) => {
                    StoreError::InvalidState(format!("user {} has no credential", user.id))
                }
                other => other,
            })?;

        let root_folder_id = FolderRepository::new(self.db.pool())
            .with_root_name(self.root_name)
            .ensure_root(user.id)
            .await?;

        debug!(user_id = user.id, root_folder_id, "Resolved user by username");
        Ok(UserAccess {
            user_id: user.id,
            username: user.username,
            password_hash: user.password_hash,
            credential: credential.token,
            root_folder_id,
        })
    }

    /// Resolve the owner of a credential.
    pub async fn get_user_by_credential(&self, credential: &str) -> Result<CredentialOwner> {
        if !is_well_formed(credential) {
            return Err(StoreError::NotFound("credential"));
        }

        let found = CredentialRepository::new(self.db.pool())
            .get_by_token(credential)
            .await?;

        debug!(user_id = found.user_id, "Resolved user by credential");
        Ok(CredentialOwner {
            user_id: found.user_id,
            credential: found.token,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{generate_credential, CredentialStore};
    use crate::file::FolderRepository;

    #[tokio::test]
    async fn test_get_user_by_username_provisions_root() {
        let db = Database::open_in_memory().await.unwrap();
        let user_id = CredentialStore::new(&db)
            .create_user("alice", "verifier")
            .await
            .unwrap();

        let folders = FolderRepository::new(db.pool());
        assert!(folders.root(user_id).await.unwrap().is_none());

        let lookup = AccessLookup::new(&db);
        let access = lookup.get_user_by_username("alice").await.unwrap();
        assert_eq!(access.user_id, user_id);
        assert_eq!(access.password_hash, "verifier");
        assert_eq!(folders.root(user_id).await.unwrap().unwrap().id, access.root_folder_id);

        let again = lookup.get_user_by_username("alice").await.unwrap();
        assert_eq!(again.root_folder_id, access.root_folder_id);
        assert_eq!(again.credential, access.credential);
    }

    #[tokio::test]
    async fn test_credential_lookup_matches_user() {
        let db = Database::open_in_memory().await.unwrap();
        let user_id = CredentialStore::new(&db)
            .create_user("alice", "verifier")
            .await
            .unwrap();
        let lookup = AccessLookup::new(&db);

        let access = lookup.get_user_by_username("alice").await.unwrap();
        let owner = lookup.get_user_by_credential(&access.credential).await.unwrap();
        assert_eq!(owner.user_id, user_id);
        assert_eq!(owner.credential, access.credential);
    }

    #[tokio::test]
    async fn test_unknown_username_is_not_found() {
        let db = Database::open_in_memory().await.unwrap();
        let err = AccessLookup::new(&db)
            .get_user_by_username("nobody")
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_unknown_or_malformed_credential_is_not_found() {
        let db = Database::open_in_memory().await.unwrap();
        let lookup = AccessLookup::new(&db);

        assert!(lookup
            .get_user_by_credential(&generate_credential())
            .await
            .unwrap_err()
            .is_not_found());
        assert!(lookup
            .get_user_by_credential("not-a-credential")
            .await
            .unwrap_err()
            .is_not_found());
    }

    #[tokio::test]
    async fn test_user_without_credential_is_invalid_state() {
        let db = Database::open_in_memory().await.unwrap();
        let user_id = CredentialStore::new(&db)
            .create_user("alice", "verifier")
            .await
            .unwrap();
        sqlx::query("DELETE FROM credentials WHERE user_id = ?")
            .bind(user_id)
            .execute(db.pool())
            .await
            .unwrap();

        let err = AccessLookup::new(&db)
            .get_user_by_username("alice")
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::InvalidState(_)));
    }
}
