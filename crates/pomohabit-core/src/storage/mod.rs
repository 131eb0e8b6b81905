mod config;
pub mod database;

pub use config::{CalendarConfig, Config, LogConfig, StorageConfig, TimerConfig};
pub use database::{Database, HABITS_KEY};

use std::sync::{Arc, Mutex};

use crate::error::StorageError;

/// Durable byte storage for the habit collection.
///
/// The repository writes the whole collection as one blob on every change
/// and reads it back once at startup.
pub trait PersistenceGateway {
    /// The stored blob, or `None` if nothing was ever saved.
    fn load(&self) -> Result<Option<Vec<u8>>, StorageError>;

    fn save(&mut self, bytes: &[u8]) -> Result<(), StorageError>;
}

/// In-memory gateway. Clones share the same slot, so a test can inspect
/// what the repository wrote.
#[derive(Debug, Clone, Default)]
pub struct MemoryGateway {
    blob: Arc<Mutex<Option<Vec<u8>>>>,
    fail_writes: Arc<Mutex<bool>>,
}

impl MemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_blob(bytes: impl Into<Vec<u8>>) -> Self {
        let gateway = Self::default();
        *lock(&gateway.blob) = Some(bytes.into());
        gateway
    }

    pub fn blob(&self) -> Option<Vec<u8>> {
        lock(&self.blob).clone()
    }

    /// Make every following `save` fail.
    pub fn fail_writes(&self, fail: bool) {
        *lock(&self.fail_writes) = fail;
    }
}

impl PersistenceGateway for MemoryGateway {
    fn load(&self) -> Result<Option<Vec<u8>>, StorageError> {
        Ok(self.blob())
    }

    fn save(&mut self, bytes: &[u8]) -> Result<(), StorageError> {
        if *lock(&self.fail_writes) {
            return Err(StorageError::WriteFailed("memory gateway is read-only".into()));
        }
        *lock(&self.blob) = Some(bytes.to_vec());
        Ok(())
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}
