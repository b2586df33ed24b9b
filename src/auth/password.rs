//! Password verifiers.
//!
//! The store keeps the verifier string opaque; these helpers are what an
//! outer collaborator uses to produce one at registration and to check a
//! login attempt against it.

use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::{Algorithm, Argon2, Params, Version};
use rand_core::OsRng;
use thiserror::Error;

/// Minimum password length in characters.
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Maximum password length in bytes.
pub const MAX_PASSWORD_LENGTH: usize = 128;

/// Password-related errors.
#[derive(Error, Debug)]
pub enum PasswordError {
    #[error("password must be at least {MIN_PASSWORD_LENGTH} characters")]
    TooShort,

    #[error("password must be at most {MAX_PASSWORD_LENGTH} bytes")]
    TooLong,

    #[error("password hashing failed: {0}")]
    Hash(String),

    #[error("malformed password verifier")]
    MalformedVerifier,
}

// Argon2id, 19 MiB, 2 passes, 1 lane.
fn hasher() -> Result<Argon2<'static>, PasswordError> {
    let params =
        Params::new(19 * 1024, 2, 1, None).map_err(|e| PasswordError::Hash(e.to_string()))?;
    Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
}

/// Check length bounds.
pub fn validate_password(password: &str) -> Result<(), PasswordError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(PasswordError::TooShort);
    }
    if password.len() > MAX_PASSWORD_LENGTH {
        return Err(PasswordError::TooLong);
    }
    Ok(())
}

/// Produce a PHC-formatted Argon2id verifier for `password`.
///
/// ```
/// let verifier = treestore::hash_password("correct horse").unwrap();
/// assert!(verifier.starts_with("$argon2id$"));
/// ```
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    validate_password(password)?;
    let salt = SaltString::generate(&mut OsRng);
    let hash = hasher()?
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| PasswordError::Hash(e.to_string()))?;
    Ok(hash.to_string())
}

/// Check `password` against a stored verifier.
///
/// Returns `Ok(false)` on mismatch; an unparsable verifier is an error.
pub fn verify_password(password: &str, verifier: &str) -> Result<bool, PasswordError> {
    let parsed = PasswordHash::new(verifier).map_err(|_| PasswordError::MalformedVerifier)?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}
