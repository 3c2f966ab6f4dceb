//! Database error types.

use std::path::PathBuf;
use thiserror::Error;

/// Errors from database operations.
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// SQLite error from rusqlite.
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// IO error when creating directories or files.
    #[error("IO error for path '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A migration failed to apply.
    #[error("Migration failed at version {version}: {reason}")]
    Migration { version: u32, reason: String },

    /// The database lock was poisoned.
    #[error("Database lock poisoned")]
    LockPoisoned,

    /// `create` was called with a job id that already exists.
    #[error("Job '{id}' already exists")]
    DuplicateJob { id: String },

    /// A query or terminal commit referenced an unknown job id.
    #[error("Job '{id}' not found")]
    JobNotFound { id: String },

    /// A terminal commit targeted a job that already reached a terminal
    /// state. The first commit wins; the stored record is unchanged.
    #[error("Job '{id}' is already in a terminal state")]
    AlreadyTerminal { id: String },
}
