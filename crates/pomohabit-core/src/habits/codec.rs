//! Blob encoding for the habit collection.
//!
//! The whole collection is one JSON array. Field names are camelCase
//! (`id`, `title`, `description`, `createdAt`, `dailyPomodoros[{date,
//! completedSessions, notes}]`) and timestamps are RFC 3339.

use super::model::Habit;
use crate::error::StorageError;

pub fn encode_habits(habits: &[Habit]) -> Result<Vec<u8>, StorageError> {
    serde_json::to_vec(habits).map_err(StorageError::Encode)
}

pub fn decode_habits(bytes: &[u8]) -> Result<Vec<Habit>, StorageError> {
    serde_json::from_slice(bytes).map_err(StorageError::Decode)
}
