//! Error types for pressurelog.
//!
//! This module defines all error types used throughout the pressurelog crate,
//! providing detailed context for debugging and user-facing messages.

use std::path::PathBuf;
use thiserror::Error;

use crate::form::ValidationError;

/// The main error type for pressurelog operations.
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

    /// A persisted value exists but could not be decoded.
    ///
    /// Loaders treat this as "nothing stored yet"; it never reaches the user.
    #[error("persisted value under '{key}' is unreadable: {message}")]
    PersistedDataUnreadable {
        /// Storage key of the value.
        key: String,
        /// Why decoding failed.
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

    // === Form Errors ===
    /// A submitted reading was rejected.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    // === I/O Errors ===
    /// File system or terminal operation failed.
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
}

/// A specialized Result type for pressurelog operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::ConfigLoad(Box::new(err))
    }
}

impl Error {
    /// Create an unreadable-data error for the given storage key.
    #[must_use]
    pub fn persisted_data_unreadable(key: impl Into<String>, message: impl Into<String>) -> Self {
        Self::PersistedDataUnreadable {
            key: key.into(),
            message: message.into(),
        }
    }

    /// Check if this error is a rejected form submission.
    #[must_use]
    pub fn is_validation_error(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}
