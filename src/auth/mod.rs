//! Identities, access credentials and password verifiers.

mod credential;
mod lookup;
mod password;
mod registration;

pub use credential::{generate_credential, is_well_formed, CREDENTIAL_LENGTH};
pub use lookup::{AccessLookup, CredentialOwner};
pub use password::{hash_password, validate_password, verify_password, PasswordError};
pub use registration::{validate_username, CredentialStore, MAX_USERNAME_LENGTH};
