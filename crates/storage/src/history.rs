//! Game history and answer audit trail, stored as strings in a `KeyValueStore`.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use quiz_core::model::{AnswerRecord, GameRecord, GameRecordError};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::repository::{AnswerLogRepository, HistoryRepository, KeyValueStore, StorageError};

/// Key holding the JSON array of completed games.
pub const HISTORY_KEY: &str = "gameHistory";

/// Key holding the newline-delimited answer trail.
pub const ANSWERS_KEY: &str = "userAnswers";

/// Reasons a stored history string could not be decoded.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum HistoryDecodeError {
    #[error("history is blank")]
    Blank,
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Record(#[from] GameRecordError),
}

/// Persisted JSON shape of a game record.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GameRecordJson {
    #[serde(with = "chrono::serde::ts_milliseconds")]
    timestamp: DateTime<Utc>,
    score: u32,
    question_texts: Vec<String>,
    chosen_answers: Vec<String>,
    correct_answers: Vec<String>,
}

impl GameRecordJson {
    fn from_record(record: &GameRecord) -> Self {
        Self {
            timestamp: record.timestamp(),
            score: record.score(),
            question_texts: record.question_texts().to_vec(),
            chosen_answers: record.chosen_answers().to_vec(),
            correct_answers: record.correct_answers().to_vec(),
        }
    }

    fn into_record(self) -> Result<GameRecord, GameRecordError> {
        GameRecord::from_persisted(
            self.timestamp,
            self.score,
            self.question_texts,
            self.chosen_answers,
            self.correct_answers,
        )
    }
}

/// Decode a stored history string.
///
/// # Errors
///
/// Returns `HistoryDecodeError` for blank input, malformed JSON, or a record whose
/// sequences are misaligned.
pub fn decode_history(raw: &str) -> Result<Vec<GameRecord>, HistoryDecodeError> {
    if raw.trim().is_empty() {
        return Err(HistoryDecodeError::Blank);
    }
    let rows: Vec<GameRecordJson> = serde_json::from_str(raw)?;
    let mut out = Vec::with_capacity(rows.len());
    for row in rows {
        out.push(row.into_record()?);
    }
    Ok(out)
}

/// Encode records as the stored JSON array.
///
/// # Errors
///
/// Returns `StorageError::Serialization` if encoding fails.
pub fn encode_history(records: &[GameRecord]) -> Result<String, StorageError> {
    let rows: Vec<GameRecordJson> = records.iter().map(GameRecordJson::from_record).collect();
    serde_json::to_string(&rows).map_err(|e| StorageError::Serialization(e.to_string()))
}

/// Append-only history log kept as one JSON array under `HISTORY_KEY`.
///
/// Appends are a plain read-modify-write with no transaction around them, which is
/// fine for a single process with a single user.
#[derive(Clone)]
pub struct HistoryStore {
    kv: Arc<dyn KeyValueStore>,
}

impl HistoryStore {
    #[must_use]
    pub fn new(kv: Arc<dyn KeyValueStore>) -> Self {
        Self { kv }
    }
}

#[async_trait]
impl HistoryRepository for HistoryStore {
    async fn append(&self, record: &GameRecord) -> Result<(), StorageError> {
        let mut records = self.load_all().await?;
        records.push(record.clone());
        let encoded = encode_history(&records)?;
        self.kv.set(HISTORY_KEY, &encoded).await?;
        debug!(id = %record.id(), total = records.len(), "appended game record");
        Ok(())
    }

    async fn load_all(&self) -> Result<Vec<GameRecord>, StorageError> {
        let Some(raw) = self.kv.get(HISTORY_KEY).await? else {
            return Ok(Vec::new());
        };
        match decode_history(&raw) {
            Ok(records) => Ok(records),
            Err(HistoryDecodeError::Blank) => Ok(Vec::new()),
            Err(err) => {
                warn!(error = %err, "discarding unreadable game history");
                Ok(Vec::new())
            }
        }
    }
}

/// Newline-delimited `question:answer:correct:score` trail under `ANSWERS_KEY`.
///
/// Debugging artifact only; nothing reads it back.
#[derive(Clone)]
pub struct AnswerAuditLog {
    kv: Arc<dyn KeyValueStore>,
}

impl AnswerAuditLog {
    #[must_use]
    pub fn new(kv: Arc<dyn KeyValueStore>) -> Self {
        Self { kv }
    }
}

#[async_trait]
impl AnswerLogRepository for AnswerAuditLog {
    async fn append_answer(&self, answer: &AnswerRecord) -> Result<(), StorageError> {
        let previous = self.kv.get(ANSWERS_KEY).await?.unwrap_or_default();
        let updated = format!("{previous}\n{}", answer.audit_line());
        self.kv.set(ANSWERS_KEY, &updated).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::InMemoryKeyValueStore;
    use chrono::Duration;
    use quiz_core::model::GameRecordId;
    use quiz_core::time::fixed_now;

    fn record(at: DateTime<Utc>, score: u32) -> GameRecord {
        GameRecord::from_persisted(
            at,
            score,
            vec!["Q1".into(), "Q2".into()],
            vec!["A1".into(), "wrong".into()],
            vec!["A1".into(), "A2".into()],
        )
        .unwrap()
    }

    fn store_with(raw: Option<&str>) -> (InMemoryKeyValueStore, HistoryStore) {
        let kv = match raw {
            Some(raw) => InMemoryKeyValueStore::with_entry(HISTORY_KEY, raw),
            None => InMemoryKeyValueStore::new(),
        };
        let store = HistoryStore::new(Arc::new(kv.clone()));
        (kv, store)
    }

    #[test]
    fn encode_then_decode_yields_equal_records() {
        let records = vec![record(fixed_now(), 10), record(fixed_now() + Duration::hours(1), 20)];
        let encoded = encode_history(&records).unwrap();
        assert_eq!(decode_history(&encoded).unwrap(), records);
    }

    #[test]
    fn encodes_camel_case_with_millisecond_timestamp() {
        let encoded = encode_history(&[record(fixed_now(), 10)]).unwrap();
        let value: serde_json::Value = serde_json::from_str(&encoded).unwrap();
        let first = &value[0];
        assert_eq!(first["timestamp"], 1_700_000_000_000_i64);
        assert_eq!(first["score"], 10);
        assert_eq!(first["questionTexts"][1], "Q2");
        assert_eq!(first["chosenAnswers"][1], "wrong");
        assert_eq!(first["correctAnswers"][1], "A2");
    }

    #[test]
    fn decode_rejects_misaligned_record() {
        let raw = r#"[{"timestamp":1,"score":0,"questionTexts":["Q"],"chosenAnswers":[],"correctAnswers":["A"]}]"#;
        let err = decode_history(raw).unwrap_err();
        assert!(matches!(err, HistoryDecodeError::Record(_)));
    }

    #[tokio::test]
    async fn absent_key_loads_empty() {
        let (_kv, store) = store_with(None);
        assert!(store.load_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn blank_value_loads_empty() {
        let (_kv, store) = store_with(Some(""));
        assert!(store.load_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn corrupt_value_loads_empty() {
        let (_kv, store) = store_with(Some("{not json"));
        assert!(store.load_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn append_keeps_insertion_order() {
        let (_kv, store) = store_with(None);
        let later = record(fixed_now() + Duration::minutes(5), 30);
        let earlier = record(fixed_now(), 10);

        store.append(&later).await.unwrap();
        store.append(&earlier).await.unwrap();

        let all = store.load_all().await.unwrap();
        assert_eq!(all, vec![later, earlier]);
    }

    #[tokio::test]
    async fn append_over_corrupt_value_starts_fresh() {
        let (kv, store) = store_with(Some("garbage"));
        let r = record(fixed_now(), 10);

        store.append(&r).await.unwrap();

        assert_eq!(store.load_all().await.unwrap(), vec![r]);
        let raw = kv.get(HISTORY_KEY).await.unwrap().unwrap();
        assert!(raw.starts_with('['));
    }

    #[tokio::test]
    async fn find_by_id_matches_timestamp() {
        let (_kv, store) = store_with(None);
        let first = record(fixed_now(), 10);
        let second = record(fixed_now() + Duration::seconds(1), 20);
        store.append(&first).await.unwrap();
        store.append(&second).await.unwrap();

        let found = store.find_by_id(second.id()).await.unwrap();
        assert_eq!(found, Some(second));

        let missing = store
            .find_by_id(GameRecordId::new(42))
            .await
            .unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn audit_log_appends_newline_delimited_lines() {
        let kv = InMemoryKeyValueStore::new();
        let log = AnswerAuditLog::new(Arc::new(kv.clone()));

        log.append_answer(&AnswerRecord::new("Q1", "A", true, 10))
            .await
            .unwrap();
        log.append_answer(&AnswerRecord::new("Q2", "B", false, 10))
            .await
            .unwrap();

        let raw = kv.get(ANSWERS_KEY).await.unwrap().unwrap();
        assert_eq!(raw, "\nQ1:A:true:10\nQ2:B:false:10");
    }
}
