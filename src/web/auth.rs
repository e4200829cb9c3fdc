//! Salted MD5 password digests.
//!
//! MD5 is fast and broken; these helpers give deterministic equality checks,
//! not strong credential storage.

use rand_core::{OsRng, RngCore};

const SALT_BYTES: usize = 16;

/// Fresh random salt rendered as 32 lowercase hex characters.
pub fn generate_salt() -> String {
    let mut bytes = [0u8; SALT_BYTES];
    OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}

pub fn hash_password(password: &str, salt: &str) -> String {
    let digest = md5::compute(format!("{password}{salt}"));
    format!("{digest:x}")
}

pub fn verify_password(password: &str, password_hash: &str, salt: &str) -> bool {
    hash_password(password, salt) == password_hash
}

/// Check a login attempt against a stored account secret.
///
/// Accounts created before salting have an empty salt and keep the plaintext
/// password; those compare directly. Salted accounts only ever compare digests.
pub fn verify_credentials(password: &str, stored: &str, salt: &str) -> bool {
    if salt.is_empty() {
        password == stored
    } else {
        verify_password(password, stored, salt)
    }
}

/// New `(hash, salt)` pair for a password.
pub fn salted_hash(password: &str) -> (String, String) {
    let salt = generate_salt();
    let hash = hash_password(password, &salt);
    (hash, salt)
}
