//! One-shot schema application.
//!
//! The schema is a single versionless script embedded at compile time.
//! Applying it is an explicit administrative action (`parlor-server
//! init-db`), never a side effect of opening a connection.

use rusqlite::Connection;
use thiserror::Error;

/// The bundled table-definition script.
pub const SCHEMA: &str = include_str!("schema.sql");

/// Errors that can occur while applying the schema script.
#[derive(Debug, Error)]
pub enum SchemaError {
    /// A statement in the schema script failed.
    #[error("schema statement failed: {0}")]
    Execution(#[from] rusqlite::Error),
}

/// Applies `schema_script` to `conn`, statement by statement.
///
/// The script assumes an empty store: its statements are plain
/// `CREATE TABLE`, so running it against a store that already holds the
/// tables fails. Statements applied before a failing one stay applied;
/// there is no rollback across the script.
///
/// # Errors
///
/// Returns [`SchemaError`] wrapping the first statement failure.
pub fn init_schema(conn: &Connection, schema_script: &str) -> Result<(), SchemaError> {
    conn.execute_batch(schema_script)?;
    tracing::debug!("schema script applied");
    Ok(())
}
