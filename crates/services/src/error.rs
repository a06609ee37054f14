//! Shared error types for the services crate.

use thiserror::Error;

use quiz_core::model::{GameRecordError, QuestionError};
use storage::repository::StorageError;
use storage::sqlite::SqliteInitError;

/// Errors emitted by question providers.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum FetchError {
    #[error("trivia request failed with status {0}")]
    HttpStatus(reqwest::StatusCode),
    #[error("trivia api returned response code {0}")]
    Api(u8),
    #[error("invalid question from trivia api: {0}")]
    InvalidQuestion(#[from] QuestionError),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

/// Errors emitted by quiz sessions and the session workflow.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SessionError {
    #[error("no questions available for session")]
    Empty,
    #[error("session is not waiting for questions")]
    NotLoading,
    #[error("no active question to answer")]
    NotActive,
    #[error("session has not completed")]
    NotComplete,
    #[error(transparent)]
    Record(#[from] GameRecordError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `HistoryService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum HistoryServiceError {
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
}
