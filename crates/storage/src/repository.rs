use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;

use exam_core::model::QuestionId;

use crate::codec;

/// Key under which the answer map is persisted.
pub const ANSWERS_KEY: &str = "quiz-answers";
/// Key under which the remaining time is persisted.
pub const TIME_KEY: &str = "quiz-time";

/// Errors surfaced by storage adapters.
///
/// Note that a malformed persisted payload is deliberately NOT an error:
/// `load` treats it as "no saved progress" so a corrupted store can never
/// block a session from starting.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Saved state of an interrupted attempt: the answer map plus remaining time.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SavedProgress {
    pub answers: Vec<(QuestionId, usize)>,
    pub remaining_secs: u32,
}

/// Durable key-value store for in-progress session state.
///
/// Writes are idempotent and last-write-wins; there is no batching and no
/// transaction spanning the two keys. Both keys are removed together on
/// submission via `clear`.
#[async_trait]
pub trait ProgressRepository: Send + Sync {
    /// Persist the full answer map. Called write-through on every selection.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the write fails.
    async fn save_answers(&self, answers: &[(QuestionId, usize)]) -> Result<(), StorageError>;

    /// Persist the remaining seconds. Called write-through on every tick.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the write fails.
    async fn save_time(&self, remaining_secs: u32) -> Result<(), StorageError>;

    /// Load the last saved pair.
    ///
    /// Returns `None` when either key is absent or malformed; a partial or
    /// corrupted store never fails the caller.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` only for store access failures, never for bad
    /// payloads.
    async fn load(&self) -> Result<Option<SavedProgress>, StorageError>;

    /// Remove both keys. Called on submission and on restart.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the delete fails.
    async fn clear(&self) -> Result<(), StorageError>;
}

/// In-memory progress store for tests and prototyping.
///
/// Holds the same raw string payloads the durable store would, so the
/// fail-soft decode path is exercised identically.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    entries: Arc<Mutex<HashMap<String, String>>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Write a raw payload directly, bypassing encoding. Lets tests plant
    /// corrupted state.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Connection` if the store lock is poisoned.
    pub fn put_raw(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut guard = self
            .entries
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[async_trait]
impl ProgressRepository for InMemoryRepository {
    async fn save_answers(&self, answers: &[(QuestionId, usize)]) -> Result<(), StorageError> {
        let payload = codec::encode_answers(answers)?;
        self.put_raw(ANSWERS_KEY, &payload)
    }

    async fn save_time(&self, remaining_secs: u32) -> Result<(), StorageError> {
        self.put_raw(TIME_KEY, &codec::encode_time(remaining_secs))
    }

    async fn load(&self) -> Result<Option<SavedProgress>, StorageError> {
        let guard = self
            .entries
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;

        let answers = guard.get(ANSWERS_KEY).and_then(|raw| codec::decode_answers(raw));
        let remaining = guard.get(TIME_KEY).and_then(|raw| codec::decode_time(raw));

        match (answers, remaining) {
            (Some(answers), Some(remaining_secs)) => Ok(Some(SavedProgress {
                answers,
                remaining_secs,
            })),
            _ => Ok(None),
        }
    }

    async fn clear(&self) -> Result<(), StorageError> {
        let mut guard = self
            .entries
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.remove(ANSWERS_KEY);
        guard.remove(TIME_KEY);
        Ok(())
    }
}

/// Aggregates the progress repository behind a trait object for backend
/// swapping.
#[derive(Clone)]
pub struct Storage {
    pub progress: Arc<dyn ProgressRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        Self {
            progress: Arc::new(InMemoryRepository::new()),
        }
    }
}
