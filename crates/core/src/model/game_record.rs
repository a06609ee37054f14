use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::model::{AnswerRecord, GameRecordId, Question};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum GameRecordError {
    #[error("game record has no questions")]
    Empty,

    #[error(
        "misaligned game record: {questions} questions, {chosen} chosen answers, {correct} correct answers"
    )]
    Misaligned {
        questions: usize,
        chosen: usize,
        correct: usize,
    },

    #[error("timestamp cannot be represented in milliseconds")]
    InvalidTimestamp,
}

/// Archived result of one completed game.
///
/// The three answer sequences are index-aligned: entry `i` of each describes
/// question `i` of the session. The timestamp is stored with millisecond precision
/// and doubles as the record id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameRecord {
    timestamp: DateTime<Utc>,
    score: u32,
    question_texts: Vec<String>,
    chosen_answers: Vec<String>,
    correct_answers: Vec<String>,
}

impl GameRecord {
    /// Rehydrate a record from persisted storage.
    ///
    /// # Errors
    ///
    /// Returns `GameRecordError::Misaligned` if the sequences differ in length,
    /// `GameRecordError::Empty` if they are empty.
    pub fn from_persisted(
        timestamp: DateTime<Utc>,
        score: u32,
        question_texts: Vec<String>,
        chosen_answers: Vec<String>,
        correct_answers: Vec<String>,
    ) -> Result<Self, GameRecordError> {
        if question_texts.len() != chosen_answers.len()
            || question_texts.len() != correct_answers.len()
        {
            return Err(GameRecordError::Misaligned {
                questions: question_texts.len(),
                chosen: chosen_answers.len(),
                correct: correct_answers.len(),
            });
        }
        if question_texts.is_empty() {
            return Err(GameRecordError::Empty);
        }

        let timestamp = DateTime::<Utc>::from_timestamp_millis(timestamp.timestamp_millis())
            .ok_or(GameRecordError::InvalidTimestamp)?;

        Ok(Self {
            timestamp,
            score,
            question_texts,
            chosen_answers,
            correct_answers,
        })
    }

    /// Build the archive record for a finished session.
    ///
    /// # Errors
    ///
    /// Returns `GameRecordError::Misaligned` if `answers` does not cover every question.
    pub fn from_session(
        completed_at: DateTime<Utc>,
        score: u32,
        questions: &[Question],
        answers: &[AnswerRecord],
    ) -> Result<Self, GameRecordError> {
        let question_texts = questions.iter().map(|q| q.text().to_owned()).collect();
        let chosen_answers = answers.iter().map(|a| a.chosen_answer.clone()).collect();
        let correct_answers = questions
            .iter()
            .map(|q| q.correct_answer().to_owned())
            .collect();

        Self::from_persisted(
            completed_at,
            score,
            question_texts,
            chosen_answers,
            correct_answers,
        )
    }

    #[must_use]
    pub fn id(&self) -> GameRecordId {
        GameRecordId::from_timestamp(self.timestamp)
    }

    #[must_use]
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    #[must_use]
    pub fn score(&self) -> u32 {
        self.score
    }

    #[must_use]
    pub fn question_texts(&self) -> &[String] {
        &self.question_texts
    }

    #[must_use]
    pub fn chosen_answers(&self) -> &[String] {
        &self.chosen_answers
    }

    #[must_use]
    pub fn correct_answers(&self) -> &[String] {
        &self.correct_answers
    }

    /// Number of questions in the game.
    #[must_use]
    pub fn len(&self) -> usize {
        self.question_texts.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.question_texts.is_empty()
    }

    /// Iterate `(question, chosen, correct)` triples in question order.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &str, &str)> {
        self.question_texts
            .iter()
            .zip(&self.chosen_answers)
            .zip(&self.correct_answers)
            .map(|((q, chosen), correct)| (q.as_str(), chosen.as_str(), correct.as_str()))
    }
}
