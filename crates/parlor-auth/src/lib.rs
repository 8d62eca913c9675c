//! User accounts and credentials for the Parlor backend.
//!
//! Stores accounts in the shared SQLite schema, hashes passwords under
//! per-account salts, and signs the session tokens the HTTP layer hands out
//! as cookies. Password hashes never leave this crate.

mod password;
mod session;

pub use password::{hash_password, verify_password};
pub use session::{issue_session_token, verify_session_token};

use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;

/// Lowercase hex SHA-256 of `input`. Shared by password and session digests.
pub(crate) fn sha256_hex(input: &str) -> String {
    let digest = Sha256::digest(input.as_bytes());
    let mut hex = String::with_capacity(digest.len() * 2);
    for byte in digest {
        hex.push(hex_char((byte >> 4) & 0x0f));
        hex.push(hex_char(byte & 0x0f));
    }
    hex
}

fn hex_char(nibble: u8) -> char {
    const HEX: [char; 16] = [
        '0', '1', '2', '3', '4', '5', '6', '7', '8', '9', 'a', 'b', 'c', 'd', 'e', 'f',
    ];
    HEX[(nibble & 0x0f) as usize]
}

/// Errors that can occur during account operations.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),
    #[error("username already taken: {0}")]
    UsernameTaken(String),
    #[error("invalid username or password")]
    InvalidCredentials,
    #[error("user not found: {0}")]
    NotFound(i64),
}

/// A registered account. Never carries the password hash.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct User {
    /// Internal database ID.
    pub id: i64,
    /// Unique login name.
    pub username: String,
    /// Creation timestamp (ISO 8601).
    pub created_at: String,
}

/// Creates a new account with a freshly salted password hash.
///
/// # Errors
///
/// Returns [`AuthError::UsernameTaken`] when the username is already
/// registered.
pub fn register_user(
    conn: &Connection,
    username: &str,
    password: &str,
) -> Result<User, AuthError> {
    let hash = hash_password(password);

    match conn.execute(
        "INSERT INTO users (username, password_hash) VALUES (?1, ?2)",
        params![username, hash],
    ) {
        Ok(_) => {}
        Err(rusqlite::Error::SqliteFailure(e, _))
            if e.code == rusqlite::ErrorCode::ConstraintViolation =>
        {
            return Err(AuthError::UsernameTaken(username.to_string()));
        }
        Err(e) => return Err(e.into()),
    }

    let id = conn.last_insert_rowid();
    tracing::info!(user_id = id, username, "registered new account");
    get_user(conn, id)
}

/// Checks a username/password pair and returns the account on success.
///
/// Unknown usernames and wrong passwords are indistinguishable to the
/// caller.
pub fn authenticate(
    conn: &Connection,
    username: &str,
    password: &str,
) -> Result<User, AuthError> {
    let row = conn
        .query_row(
            "SELECT id, username, created_at, password_hash FROM users WHERE username = ?1",
            [username],
            |row| Ok((map_row_to_user(row)?, row.get::<_, String>(3)?)),
        )
        .optional()?;

    match row {
        Some((user, stored)) if verify_password(password, &stored) => Ok(user),
        _ => Err(AuthError::InvalidCredentials),
    }
}

/// Retrieves an account by database ID.
pub fn get_user(conn: &Connection, id: i64) -> Result<User, AuthError> {
    conn.query_row(
        "SELECT id, username, created_at FROM users WHERE id = ?1",
        [id],
        map_row_to_user,
    )
    .optional()?
    .ok_or(AuthError::NotFound(id))
}

fn map_row_to_user(row: &Row) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        username: row.get(1)?,
        created_at: row.get(2)?,
    })
}
