//! Salted password digests.
//!
//! Stored format: `{salt}${digest}` where the digest is
//! `sha256(salt + ":" + password)` and the salt is a fresh v4 UUID per
//! account.

use crate::sha256_hex;
use subtle::ConstantTimeEq;
use uuid::Uuid;

/// Hashes `password` under a fresh random salt.
pub fn hash_password(password: &str) -> String {
    let salt = Uuid::new_v4().simple().to_string();
    let digest = sha256_hex(&format!("{salt}:{password}"));
    format!("{salt}${digest}")
}

/// Checks `password` against a stored `salt$digest` value.
///
/// A malformed stored value is just a failed check, not an error. The
/// digest comparison is constant-time.
pub fn verify_password(password: &str, stored: &str) -> bool {
    let Some((salt, digest)) = stored.split_once('$') else {
        return false;
    };
    let candidate = sha256_hex(&format!("{salt}:{password}"));
    candidate.as_bytes().ct_eq(digest.as_bytes()).into()
}
