//! Access credential generation.

use rand::RngCore;

/// Random bytes per credential (256 bits).
pub const CREDENTIAL_BYTES: usize = 32;

/// Length of the hex-encoded credential.
pub const CREDENTIAL_LENGTH: usize = CREDENTIAL_BYTES * 2;

/// Generate a fresh opaque credential: 32 CSPRNG bytes as lowercase hex.
pub fn generate_credential() -> String {
    let mut bytes = [0u8; CREDENTIAL_BYTES];
    rand::rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Cheap shape check before a credential lookup hits the database.
pub fn is_well_formed(credential: &str) -> bool {
    credential.len() == CREDENTIAL_LENGTH
        && credential
            .bytes()
            .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b))
}
