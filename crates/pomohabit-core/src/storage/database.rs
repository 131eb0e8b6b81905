//! SQLite-backed key-value storage.
//!
//! A single `kv` table holds opaque blobs. The habit collection lives under
//! [`HABITS_KEY`]; the table can hold other application state as well.

use std::path::Path;

use rusqlite::{params, Connection, OptionalExtension};

use super::PersistenceGateway;
use crate::error::StorageError;

/// Key under which the habit collection is stored.
pub const HABITS_KEY: &str = "habits";

/// SQLite database for key-value storage.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open the database at `path`, creating file and schema if needed.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let path = path.as_ref();
        let conn = Connection::open(path).map_err(|source| StorageError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    /// Open an in-memory database.
    pub fn open_memory() -> Result<Self, StorageError> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&self) -> Result<(), rusqlite::Error> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS kv (
                key   TEXT PRIMARY KEY,
                value BLOB NOT NULL
            );",
        )?;
        Ok(())
    }

    /// Get a value from the kv store.
    pub fn kv_get(&self, key: &str) -> Result<Option<Vec<u8>>, rusqlite::Error> {
        self.conn
            .query_row(
                "SELECT value FROM kv WHERE key = ?1",
                params![key],
                |row| row.get::<_, Vec<u8>>(0),
            )
            .optional()
    }

    /// Set a value in the kv store.
    pub fn kv_set(&self, key: &str, value: &[u8]) -> Result<(), rusqlite::Error> {
        self.conn.execute(
            "INSERT OR REPLACE INTO kv (key, value) VALUES (?1, ?2)",
            params![key, value],
        )?;
        Ok(())
    }
}

impl PersistenceGateway for Database {
    fn load(&self) -> Result<Option<Vec<u8>>, StorageError> {
        self.kv_get(HABITS_KEY).map_err(StorageError::from)
    }

    fn save(&mut self, bytes: &[u8]) -> Result<(), StorageError> {
        self.kv_set(HABITS_KEY, bytes)
            .map_err(|e| StorageError::WriteFailed(e.to_string()))
    }
}
