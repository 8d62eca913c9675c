//! Database layer for the Parlor backend.
//!
//! Provides the per-request SQLite connection lifecycle and one-shot schema
//! application. Each unit of work owns a [`RequestContext`] that lazily opens
//! at most one connection and releases it at teardown; there is no
//! cross-request pool and no process-wide connection state.
//!
//! # Design decisions
//!
//! - **One connection per request context**: every in-flight request gets its
//!   own connection, opened on first use and closed when the context ends.
//!   Concurrent requests each hold an isolated handle; the SQLite file's own
//!   locking governs concurrent access to the store.
//! - **Explicit lifecycle state**: the context tracks its connection slot as
//!   `Absent`, `Open`, or `Closed` rather than inferring state from the
//!   presence of a value, so the legal transitions are checkable.
//! - **Embedded schema**: the table-definition script is compiled into the
//!   binary via `include_str!`, so `init-db` cannot drift from the code that
//!   depends on the tables it creates.

mod registry;
mod schema;

pub use registry::{ConnectionError, ConnectionState, DbSettings, RequestContext};
pub use schema::{init_schema, SchemaError, SCHEMA};
