//! Signed session tokens.
//!
//! A token is `{user_id}.{sha256(secret + ":" + user_id)}`: a stateless
//! signed credential holding the account ID. There is no server-side
//! session state; a token stays valid as long as the account and secret do.

use crate::sha256_hex;
use subtle::ConstantTimeEq;

/// Signs a session token for `user_id` under `secret`.
pub fn issue_session_token(secret: &str, user_id: i64) -> String {
    format!("{user_id}.{}", signature_hex(secret, user_id))
}

/// Verifies a session token and returns the user ID it names.
///
/// Returns `None` for malformed tokens and for signatures that do not
/// match under `secret`. The signature comparison is constant-time.
pub fn verify_session_token(secret: &str, token: &str) -> Option<i64> {
    let (id_part, signature) = token.split_once('.')?;
    let user_id: i64 = id_part.parse().ok()?;

    let expected = signature_hex(secret, user_id);
    if expected.as_bytes().ct_eq(signature.as_bytes()).into() {
        Some(user_id)
    } else {
        None
    }
}

fn signature_hex(secret: &str, user_id: i64) -> String {
    sha256_hex(&format!("{secret}:{user_id}"))
}
