//! Core error types for pomohabit-core.
//!
//! Errors are grouped by concern with thiserror. Most repository and registry
//! operations are total and never fail; these types surface from storage,
//! configuration, and the load-time fallback side channel.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by a persistence gateway or by the habit blob codec.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Failed to open the backing store
    #[error("Failed to open store at {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// Reading the persisted blob failed
    #[error("Read failed: {0}")]
    ReadFailed(String),

    /// Writing the blob failed
    #[error("Write failed: {0}")]
    WriteFailed(String),

    /// The persisted blob could not be decoded
    #[error("Persisted habits could not be decoded: {0}")]
    Decode(#[source] serde_json::Error),

    /// The collection could not be encoded
    #[error("Habits could not be encoded: {0}")]
    Encode(#[source] serde_json::Error),

    /// Database is locked
    #[error("Database is locked")]
    Locked,
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Unknown configuration key
    #[error("unknown config key: {0}")]
    UnknownKey(String),
}

impl From<rusqlite::Error> for StorageError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(inner, _msg)
                if inner.code == rusqlite::ErrorCode::DatabaseLocked =>
            {
                StorageError::Locked
            }
            _ => StorageError::ReadFailed(err.to_string()),
        }
    }
}
