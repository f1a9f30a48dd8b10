//! Error types for sketchnote.
//!
//! This module defines all error types used throughout the sketchnote crate,
//! providing detailed context for debugging and user-friendly error messages.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for sketchnote operations.
#[derive(Error, Debug)]
pub enum Error {
    // === Storage Errors ===
    /// Failed to open or create the database.
    #[error("failed to open database at {path}: {source}")]
    DatabaseOpen {
        /// Path to the database file.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: rusqlite::Error,
    },

    /// A database query failed.
    #[error("database query failed: {0}")]
    DatabaseQuery(#[from] rusqlite::Error),

    /// Failed to run database migrations.
    #[error("database migration failed: {message}")]
    DatabaseMigration {
        /// Description of what went wrong.
        message: String,
    },

    // === Configuration Errors ===
    /// Failed to load configuration.
    #[error("failed to load configuration: {0}")]
    ConfigLoad(Box<figment::Error>),

    /// Configuration validation failed.
    #[error("invalid configuration: {message}")]
    ConfigValidation {
        /// Description of the validation failure.
        message: String,
    },

    // === Domain Errors ===
    /// A notebook or note does not exist.
    #[error("{kind} not found: {id}")]
    NotFound {
        /// What was looked up ("notebook", "note", "user").
        kind: &'static str,
        /// The identifier that was looked up.
        id: String,
    },

    /// A notebook was changed in a way only its owner may change it.
    #[error("notebook {id} belongs to another user")]
    NotOwner {
        /// The notebook that was touched.
        id: i64,
    },

    /// Input supplied by the user or caller was rejected.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A drawing script could not be read.
    #[error("script error on line {line}: {message}")]
    Script {
        /// 1-based line number.
        line: usize,
        /// Description of what went wrong.
        message: String,
    },

    /// A background task ended without producing a result.
    #[error("task failed: {0}")]
    Task(String),

    // === I/O Errors ===
    /// File system operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to create a required directory.
    #[error("failed to create directory {path}: {source}")]
    DirectoryCreate {
        /// Path that couldn't be created.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    // === Serialization Errors ===
    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // === Generic Errors ===
    /// An internal error occurred (bug).
    #[error("internal error: {0}")]
    Internal(String),
}

/// A specialized Result type for sketchnote operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::ConfigLoad(Box::new(err))
    }
}

impl From<tokio::task::JoinError> for Error {
    fn from(err: tokio::task::JoinError) -> Self {
        Self::Task(err.to_string())
    }
}

impl Error {
    /// Create a not-found error for a notebook.
    #[must_use]
    pub fn notebook_not_found(id: i64) -> Self {
        Self::NotFound {
            kind: "notebook",
            id: id.to_string(),
        }
    }

    /// Create a not-found error for a note.
    #[must_use]
    pub fn note_not_found(notebook_id: i64, note_id: i64) -> Self {
        Self::NotFound {
            kind: "note",
            id: format!("{notebook_id}/{note_id}"),
        }
    }

    /// Create a not-found error for a user, looked up by id or email.
    #[must_use]
    pub fn user_not_found(key: impl Into<String>) -> Self {
        Self::NotFound {
            kind: "user",
            id: key.into(),
        }
    }

    /// Create an ownership error for a notebook.
    #[must_use]
    pub fn not_owner(id: i64) -> Self {
        Self::NotOwner { id }
    }

    /// Create a new invalid input error.
    #[must_use]
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    /// Create a new script error.
    #[must_use]
    pub fn script(line: usize, message: impl Into<String>) -> Self {
        Self::Script {
            line,
            message: message.into(),
        }
    }

    /// Create a new internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Check if this error indicates a missing notebook or note.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Check if this error was caused by acting on someone else's notebook.
    #[must_use]
    pub fn is_not_owner(&self) -> bool {
        matches!(self, Self::NotOwner { .. })
    }

    /// Check if this error was caused by rejected input.
    #[must_use]
    pub fn is_invalid_input(&self) -> bool {
        matches!(self, Self::InvalidInput(_) | Self::Script { .. })
    }
}
