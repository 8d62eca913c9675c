//! Per-request connection lifecycle.

use rusqlite::{Connection, OpenFlags};
use thiserror::Error;

/// Settings for opening SQLite connections.
///
/// Read-only input to the registry; never mutated by it. Safe to share
/// across every request context in the process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DbSettings {
    /// Path to the SQLite database file.
    pub path: String,

    /// Busy timeout applied to every connection, in milliseconds.
    pub busy_timeout_ms: u64,
}

impl DbSettings {
    /// Creates settings for the given database path with the default busy
    /// timeout.
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            busy_timeout_ms: 5_000,
        }
    }
}

/// Errors that can occur when opening a database connection.
#[derive(Debug, Error)]
pub enum ConnectionError {
    /// The database file could not be opened.
    #[error("failed to open database at {path}: {source}")]
    Open {
        /// The path that could not be opened.
        path: String,
        /// The underlying SQLite error.
        source: rusqlite::Error,
    },

    /// The connection was opened but could not be configured.
    #[error("failed to configure database connection: {0}")]
    Configure(rusqlite::Error),
}

/// Observable lifecycle state of a context's connection slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// No connection has been opened for this context.
    Absent,
    /// A live connection is cached on the context.
    Open,
    /// The context's connection has been released.
    Closed,
}

/// Connection slot for a request context.
#[derive(Debug, Default)]
enum DbSlot {
    #[default]
    Absent,
    Open(Connection),
    Closed,
}

/// The scope of one unit of work.
///
/// Holds at most one live database connection, opened lazily by
/// [`get_connection`](RequestContext::get_connection) and released by
/// [`close_connection`](RequestContext::close_connection). Dropping the
/// context releases the connection too, so a handle opened for a context
/// never outlives it, even on unwind. A context belongs to a single logical
/// thread of control; each in-flight request constructs its own.
#[derive(Debug, Default)]
pub struct RequestContext {
    db: DbSlot,
}

impl RequestContext {
    /// Creates a context with no connection.
    pub fn new() -> Self {
        Self { db: DbSlot::Absent }
    }

    /// Reports the current state of the connection slot.
    pub fn state(&self) -> ConnectionState {
        match self.db {
            DbSlot::Absent => ConnectionState::Absent,
            DbSlot::Open(_) => ConnectionState::Open,
            DbSlot::Closed => ConnectionState::Closed,
        }
    }

    /// Returns this context's connection, opening it on first use.
    ///
    /// Repeated calls within one context hand back the same connection; no
    /// duplicate is ever opened. Rows read through the handle are
    /// addressable by position or by column name. On failure the slot is
    /// left exactly as it was.
    ///
    /// # Errors
    ///
    /// Returns [`ConnectionError`] if the store cannot be opened or the
    /// connection cannot be configured.
    pub fn get_connection(
        &mut self,
        settings: &DbSettings,
    ) -> Result<&Connection, ConnectionError> {
        match self.db {
            DbSlot::Open(_) => {}
            DbSlot::Absent => {
                self.db = DbSlot::Open(open_connection(settings)?);
            }
            DbSlot::Closed => {
                // A context is one unit of work; reuse after close is a
                // caller bug, but the closed slot behaves like an absent one.
                tracing::warn!(
                    path = %settings.path,
                    "request context reused after close, opening a fresh connection"
                );
                self.db = DbSlot::Open(open_connection(settings)?);
            }
        }

        match &self.db {
            DbSlot::Open(conn) => Ok(conn),
            _ => unreachable!("connection slot was just filled"),
        }
    }

    /// Closes this context's connection if one is open.
    ///
    /// Safe to call any number of times: closing an already-closed or
    /// never-opened context is a no-op. Close failures are logged and
    /// swallowed so teardown always completes.
    pub fn close_connection(&mut self) {
        match std::mem::replace(&mut self.db, DbSlot::Closed) {
            DbSlot::Open(conn) => {
                if let Err((_conn, e)) = conn.close() {
                    tracing::warn!(error = %e, "failed to close database connection");
                }
            }
            DbSlot::Absent => self.db = DbSlot::Absent,
            DbSlot::Closed => {}
        }
    }
}

impl Drop for RequestContext {
    fn drop(&mut self) {
        self.close_connection();
    }
}

/// Opens and configures a connection to the store at `settings.path`.
fn open_connection(settings: &DbSettings) -> Result<Connection, ConnectionError> {
    let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
        | OpenFlags::SQLITE_OPEN_CREATE
        | OpenFlags::SQLITE_OPEN_FULL_MUTEX;

    let conn =
        Connection::open_with_flags(&settings.path, flags).map_err(|source| {
            ConnectionError::Open {
                path: settings.path.clone(),
                source,
            }
        })?;

    conn.execute_batch(&format!(
        "PRAGMA foreign_keys = ON;
         PRAGMA busy_timeout = {};",
        settings.busy_timeout_ms
    ))
    .map_err(ConnectionError::Configure)?;

    Ok(conn)
}
