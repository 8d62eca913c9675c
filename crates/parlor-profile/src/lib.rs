//! Profile reads and updates for the Parlor backend.
//!
//! A profile is the public view of an account: username plus the optional
//! display name and bio. Profiles live on the `users` table; this crate
//! never touches credentials.

use rusqlite::{Connection, OptionalExtension, Row};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur during profile operations.
#[derive(Debug, Error)]
pub enum ProfileError {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),
    #[error("profile not found: {0}")]
    NotFound(String),
}

/// The public view of an account.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Profile {
    /// Internal database ID of the account.
    pub user_id: i64,
    /// Unique login name.
    pub username: String,
    /// Optional display name.
    pub display_name: Option<String>,
    /// Optional free-form bio.
    pub bio: Option<String>,
    /// Account creation timestamp (ISO 8601).
    pub created_at: String,
}

/// Fields to change on a profile. `None` fields are left untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProfileUpdate {
    pub display_name: Option<String>,
    pub bio: Option<String>,
}

const PROFILE_COLUMNS: &str = "id, username, display_name, bio, created_at";

/// Retrieves a profile by username.
pub fn get_profile(conn: &Connection, username: &str) -> Result<Profile, ProfileError> {
    conn.query_row(
        &format!("SELECT {PROFILE_COLUMNS} FROM users WHERE username = ?1"),
        [username],
        map_row_to_profile,
    )
    .optional()?
    .ok_or_else(|| ProfileError::NotFound(username.to_string()))
}

/// Retrieves a profile by account ID.
pub fn get_profile_by_id(conn: &Connection, user_id: i64) -> Result<Profile, ProfileError> {
    conn.query_row(
        &format!("SELECT {PROFILE_COLUMNS} FROM users WHERE id = ?1"),
        [user_id],
        map_row_to_profile,
    )
    .optional()?
    .ok_or_else(|| ProfileError::NotFound(user_id.to_string()))
}

/// Updates a profile using a single atomic UPDATE statement.
///
/// Only fields that are `Some` in `updates` are modified; `None` fields are
/// left untouched. With nothing to change this is a no-op beyond an
/// existence check.
pub fn update_profile(
    conn: &Connection,
    user_id: i64,
    updates: &ProfileUpdate,
) -> Result<(), ProfileError> {
    let mut set_parts: Vec<String> = Vec::new();
    let mut values: Vec<Box<dyn rusqlite::types::ToSql>> = Vec::new();
    let mut idx = 1usize;

    if let Some(display_name) = &updates.display_name {
        set_parts.push(format!("display_name = ?{}", idx));
        values.push(Box::new(display_name.clone()));
        idx += 1;
    }
    if let Some(bio) = &updates.bio {
        set_parts.push(format!("bio = ?{}", idx));
        values.push(Box::new(bio.clone()));
        idx += 1;
    }

    if set_parts.is_empty() {
        let _ = get_profile_by_id(conn, user_id)?;
        return Ok(());
    }

    let sql = format!(
        "UPDATE users SET {} WHERE id = ?{}",
        set_parts.join(", "),
        idx
    );
    values.push(Box::new(user_id));

    let params: Vec<&dyn rusqlite::types::ToSql> = values.iter().map(|v| v.as_ref()).collect();
    let count = conn.execute(&sql, params.as_slice())?;
    if count == 0 {
        return Err(ProfileError::NotFound(user_id.to_string()));
    }

    tracing::debug!(user_id, "profile updated");
    Ok(())
}

fn map_row_to_profile(row: &Row) -> rusqlite::Result<Profile> {
    Ok(Profile {
        user_id: row.get(0)?,
        username: row.get(1)?,
        display_name: row.get(2)?,
        bio: row.get(3)?,
        created_at: row.get(4)?,
    })
}
