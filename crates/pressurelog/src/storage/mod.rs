//! Storage layer for pressurelog.
//!
//! This module provides a `SQLite`-backed key-value store with the same
//! shape as browser local storage: string keys mapped to string values,
//! read and written synchronously.

pub mod migrations;
pub mod schema;

use std::path::{Path, PathBuf};

use rusqlite::{params, Connection, OptionalExtension};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, info};

use crate::error::{Error, Result};

/// Persistent key-value storage.
///
/// Every write is committed before the call returns, so a value read back
/// after `set_item` is always the value just written.
#[derive(Debug)]
pub struct LocalStorage {
    /// Path to the database file.
    path: PathBuf,
    /// Database connection.
    conn: Connection,
}

impl LocalStorage {
    /// Open or create a storage database at the given path.
    ///
    /// Creates the parent directories and database file if they don't exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or schema initialization fails.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|source| Error::DirectoryCreate {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }

        debug!("Opening database at {}", path.display());
        let conn = Connection::open(&path).map_err(|source| Error::DatabaseOpen {
            path: path.clone(),
            source,
        })?;

        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=FULL;")?;

        migrations::initialize_schema(&conn)?;

        info!("Database opened successfully at {}", path.display());
        Ok(Self { path, conn })
    }

    /// Create an in-memory storage instance for testing.
    ///
    /// # Errors
    ///
    /// Returns an error if the in-memory database cannot be created.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(|source| Error::DatabaseOpen {
            path: PathBuf::from(":memory:"),
            source,
        })?;

        migrations::initialize_schema(&conn)?;

        Ok(Self {
            path: PathBuf::from(":memory:"),
            conn,
        })
    }

    /// Get the path to the database file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the raw value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn get_item(&self, key: &str) -> Result<Option<String>> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM local_storage WHERE key = ?1",
                [key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value)
    }

    /// Store `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn set_item(&self, key: &str, value: &str) -> Result<()> {
        self.conn.execute(
            r"
            INSERT INTO local_storage (key, value, updated_at)
            VALUES (?1, ?2, datetime('now'))
            ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at
            ",
            params![key, value],
        )?;
        debug!("Stored {} bytes under '{}'", value.len(), key);
        Ok(())
    }

    /// Delete the value stored under `key`.
    ///
    /// Returns `true` if a value was removed.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn remove_item(&self, key: &str) -> Result<bool> {
        let affected = self
            .conn
            .execute("DELETE FROM local_storage WHERE key = ?1", [key])?;
        Ok(affected > 0)
    }

    /// Read and decode the JSON value stored under `key`.
    ///
    /// Returns `Ok(None)` when nothing is stored.
    ///
    /// # Errors
    ///
    /// Returns [`Error::PersistedDataUnreadable`] if the stored text does not
    /// decode as `T`, or a database error if the read fails.
    pub fn get_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        let Some(raw) = self.get_item(key)? else {
            return Ok(None);
        };
        serde_json::from_str(&raw)
            .map(Some)
            .map_err(|e| Error::persisted_data_unreadable(key, e.to_string()))
    }

    /// Encode `value` as JSON and store it under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the database write fails.
    pub fn set_json<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<()> {
        let raw = serde_json::to_string(value)?;
        self.set_item(key, &raw)
    }
}
