use chrono::{DateTime, Utc};
use std::sync::Arc;

use quiz_core::model::{GameRecord, GameRecordId};
use storage::repository::HistoryRepository;

use crate::error::HistoryServiceError;
use crate::share;

/// Presentation-agnostic row for the history list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameHistoryListItem {
    pub id: GameRecordId,
    pub completed_at: DateTime<Utc>,
    pub score: u32,
    pub question_count: usize,
}

impl GameHistoryListItem {
    #[must_use]
    pub fn from_record(record: &GameRecord) -> Self {
        Self {
            id: record.id(),
            completed_at: record.timestamp(),
            score: record.score(),
            question_count: record.len(),
        }
    }

    /// Route key for the detail view.
    #[must_use]
    pub fn key(&self) -> String {
        self.id.to_string()
    }
}

/// Read-only facade over the history log for browsing and detail views.
#[derive(Clone)]
pub struct HistoryService {
    history: Arc<dyn HistoryRepository>,
}

impl HistoryService {
    #[must_use]
    pub fn new(history: Arc<dyn HistoryRepository>) -> Self {
        Self { history }
    }

    #[must_use]
    pub fn in_memory() -> Self {
        Self::new(storage::repository::Storage::in_memory().history)
    }

    /// All archived games, newest first.
    ///
    /// # Errors
    ///
    /// Returns `HistoryServiceError::Storage` on backend failures.
    pub async fn list_recent(&self) -> Result<Vec<GameHistoryListItem>, HistoryServiceError> {
        let mut items: Vec<GameHistoryListItem> = self
            .history
            .load_all()
            .await?
            .iter()
            .map(GameHistoryListItem::from_record)
            .collect();
        items.sort_by(|a, b| b.completed_at.cmp(&a.completed_at));
        Ok(items)
    }

    /// Resolve a detail route key. Unknown or malformed keys yield `None`.
    ///
    /// # Errors
    ///
    /// Returns `HistoryServiceError::Storage` on backend failures.
    pub async fn detail(&self, key: &str) -> Result<Option<GameRecord>, HistoryServiceError> {
        let Ok(id) = key.parse::<GameRecordId>() else {
            return Ok(None);
        };
        Ok(self.history.find_by_id(id).await?)
    }

    /// Share text for the game behind `key`, if it exists.
    ///
    /// # Errors
    ///
    /// Returns `HistoryServiceError::Storage` on backend failures.
    pub async fn share_text(&self, key: &str) -> Result<Option<String>, HistoryServiceError> {
        Ok(self.detail(key).await?.as_ref().map(share::share_text))
    }
}
