// crates/hireflow-store-sqlite/src/error.rs
// ============================================================================
// Module: SQLite Store Errors
// Description: The store's own error type, convertible into the shared
//              pipeline error taxonomy at crate boundaries.
// Dependencies: hireflow-core, thiserror
// ============================================================================

use hireflow_core::PipelineError;
use thiserror::Error;

/// Errors raised by the `SQLite`-backed store.
#[derive(Debug, Error)]
pub enum SqliteStoreError {
    /// The store path is invalid (e.g. points at a directory).
    #[error("invalid store path: {0}")]
    InvalidPath(String),
    /// A `SQLite` operation failed.
    #[error("database error: {0}")]
    Db(String),
    /// The on-disk schema version is newer than this binary understands.
    #[error("unsupported schema version: {0}")]
    VersionMismatch(i64),
    /// A stored JSON column failed to deserialize into its expected shape.
    #[error("corrupt stored data: {0}")]
    Corrupt(String),
    /// The requested entity does not exist.
    #[error("not found: {0}")]
    NotFound(String),
    /// The requested write would violate a uniqueness constraint.
    #[error("conflict: {0}")]
    Conflict(String),
}

impl From<rusqlite::Error> for SqliteStoreError {
    fn from(err: rusqlite::Error) -> Self {
        Self::Db(err.to_string())
    }
}

impl From<SqliteStoreError> for PipelineError {
    fn from(err: SqliteStoreError) -> Self {
        match err {
            SqliteStoreError::NotFound(msg) => Self::NotFound(msg),
            SqliteStoreError::Conflict(msg) => Self::Conflict(msg),
            SqliteStoreError::InvalidPath(msg) | SqliteStoreError::Corrupt(msg) => {
                Self::Invariant(msg)
            }
            SqliteStoreError::VersionMismatch(version) => {
                Self::Invariant(format!("unsupported schema version: {version}"))
            }
            SqliteStoreError::Db(msg) => Self::TransientExternal(msg),
        }
    }
}
