use async_trait::async_trait;
use quiz_core::model::{AnswerRecord, GameRecord, GameRecordId};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;

use crate::history::{AnswerAuditLog, HistoryStore};

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// String key-value storage, the persistence primitive underneath history.
///
/// Mirrors a platform preferences store: one string per key, last write wins.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Read the value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be read.
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Store `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be written.
    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// Append-only log of completed games.
#[async_trait]
pub trait HistoryRepository: Send + Sync {
    /// Append a completed game to the log.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be read or written.
    async fn append(&self, record: &GameRecord) -> Result<(), StorageError>;

    /// Load every stored game in insertion order.
    ///
    /// Unreadable history yields an empty list rather than an error.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` only for backend failures.
    async fn load_all(&self) -> Result<Vec<GameRecord>, StorageError>;

    /// Look up a game by id with a linear scan of `load_all`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` only for backend failures.
    async fn find_by_id(&self, id: GameRecordId) -> Result<Option<GameRecord>, StorageError> {
        let records = self.load_all().await?;
        Ok(records.into_iter().find(|record| record.id() == id))
    }
}

/// Write-only audit trail of individual answers.
#[async_trait]
pub trait AnswerLogRepository: Send + Sync {
    /// Append one answer to the trail.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be read or written.
    async fn append_answer(&self, answer: &AnswerRecord) -> Result<(), StorageError>;
}

/// Simple in-memory key-value store for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryKeyValueStore {
    entries: Arc<Mutex<HashMap<String, String>>>,
}

impl InMemoryKeyValueStore {
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Store seeded with a single entry, handy for corrupt-data tests.
    #[must_use]
    pub fn with_entry(key: &str, value: &str) -> Self {
        let store = Self::new();
        if let Ok(mut guard) = store.entries.lock() {
            guard.insert(key.to_owned(), value.to_owned());
        }
        store
    }
}

#[async_trait]
impl KeyValueStore for InMemoryKeyValueStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let guard = self
            .entries
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut guard = self
            .entries
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.insert(key.to_owned(), value.to_owned());
        Ok(())
    }
}

/// Aggregates the key-value backend and the stores built on it behind trait objects.
#[derive(Clone)]
pub struct Storage {
    pub kv: Arc<dyn KeyValueStore>,
    pub history: Arc<dyn HistoryRepository>,
    pub answers: Arc<dyn AnswerLogRepository>,
}

impl Storage {
    /// Wire history and the answer trail onto a single key-value backend.
    #[must_use]
    pub fn from_kv(kv: Arc<dyn KeyValueStore>) -> Self {
        let history: Arc<dyn HistoryRepository> = Arc::new(HistoryStore::new(Arc::clone(&kv)));
        let answers: Arc<dyn AnswerLogRepository> =
            Arc::new(AnswerAuditLog::new(Arc::clone(&kv)));
        Self {
            kv,
            history,
            answers,
        }
    }

    #[must_use]
    pub fn in_memory() -> Self {
        Self::from_kv(Arc::new(InMemoryKeyValueStore::new()))
    }
}
