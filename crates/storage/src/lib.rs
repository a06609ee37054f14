#![forbid(unsafe_code)]

pub mod history;
pub mod repository;
pub mod sqlite;

pub use history::{ANSWERS_KEY, AnswerAuditLog, HISTORY_KEY, HistoryStore};
pub use repository::{
    AnswerLogRepository, HistoryRepository, InMemoryKeyValueStore, KeyValueStore, Storage,
    StorageError,
};
