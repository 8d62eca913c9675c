//! Message persistence for the Parlor backend.
//!
//! Messages are short authored posts, listed newest-first with the author's
//! username joined in. Authorship checks (who may edit or delete) belong to
//! the HTTP layer; this crate only persists.

use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur during message operations.
#[derive(Debug, Error)]
pub enum MessageError {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),
    #[error("message not found: {0}")]
    NotFound(i64),
}

/// An authored message.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Message {
    /// Internal database ID.
    pub id: i64,
    /// Account ID of the author.
    pub author_id: i64,
    /// Username of the author.
    pub author: String,
    /// Message title.
    pub title: String,
    /// Message body.
    pub body: String,
    /// Creation timestamp (ISO 8601).
    pub created_at: String,
}

const MESSAGE_SELECT: &str = "SELECT m.id, m.author_id, u.username, m.title, m.body, m.created_at
     FROM messages m JOIN users u ON u.id = m.author_id";

/// Creates a message and returns the stored row.
pub fn create_message(
    conn: &Connection,
    author_id: i64,
    title: &str,
    body: &str,
) -> Result<Message, MessageError> {
    conn.execute(
        "INSERT INTO messages (author_id, title, body) VALUES (?1, ?2, ?3)",
        params![author_id, title, body],
    )?;

    let id = conn.last_insert_rowid();
    tracing::debug!(message_id = id, author_id, "message created");
    get_message(conn, id)
}

/// Retrieves a message by ID.
pub fn get_message(conn: &Connection, id: i64) -> Result<Message, MessageError> {
    conn.query_row(
        &format!("{MESSAGE_SELECT} WHERE m.id = ?1"),
        [id],
        map_row_to_message,
    )
    .optional()?
    .ok_or(MessageError::NotFound(id))
}

/// Lists all messages, newest first.
pub fn list_messages(conn: &Connection) -> Result<Vec<Message>, MessageError> {
    let mut stmt =
        conn.prepare(&format!("{MESSAGE_SELECT} ORDER BY m.created_at DESC, m.id DESC"))?;

    let rows = stmt.query_map([], map_row_to_message)?;
    let mut messages = Vec::new();
    for row in rows {
        messages.push(row?);
    }
    Ok(messages)
}

/// Replaces a message's title and body.
pub fn update_message(
    conn: &Connection,
    id: i64,
    title: &str,
    body: &str,
) -> Result<(), MessageError> {
    let count = conn.execute(
        "UPDATE messages SET title = ?1, body = ?2 WHERE id = ?3",
        params![title, body, id],
    )?;
    if count == 0 {
        return Err(MessageError::NotFound(id));
    }
    Ok(())
}

/// Deletes a message.
pub fn delete_message(conn: &Connection, id: i64) -> Result<(), MessageError> {
    let count = conn.execute("DELETE FROM messages WHERE id = ?1", [id])?;
    if count == 0 {
        return Err(MessageError::NotFound(id));
    }
    tracing::debug!(message_id = id, "message deleted");
    Ok(())
}

fn map_row_to_message(row: &Row) -> rusqlite::Result<Message> {
    Ok(Message {
        id: row.get(0)?,
        author_id: row.get(1)?,
        author: row.get(2)?,
        title: row.get(3)?,
        body: row.get(4)?,
        created_at: row.get(5)?,
    })
}
