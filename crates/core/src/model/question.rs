use thiserror::Error;

/// Number of wrong answers shipped with every multiple-choice question.
pub const INCORRECT_ANSWER_COUNT: usize = 3;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuestionError {
    #[error("question text cannot be empty")]
    EmptyText,

    #[error("correct answer cannot be empty")]
    EmptyCorrectAnswer,

    #[error("expected {expected} incorrect answers, got {actual}")]
    IncorrectAnswerCount { expected: usize, actual: usize },
}

/// A single multiple-choice trivia question.
///
/// All text is HTML-entity-decoded at construction, so comparisons and display
/// operate on the plain strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    text: String,
    correct_answer: String,
    incorrect_answers: Vec<String>,
    category: String,
}

impl Question {
    /// Build a question from raw provider fields, decoding HTML entities.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError` if the text or correct answer is blank, or if the
    /// number of incorrect answers is not `INCORRECT_ANSWER_COUNT`.
    pub fn new(
        text: impl AsRef<str>,
        correct_answer: impl AsRef<str>,
        incorrect_answers: impl IntoIterator<Item = impl AsRef<str>>,
        category: impl AsRef<str>,
    ) -> Result<Self, QuestionError> {
        let text = decode_entities(text.as_ref());
        if text.trim().is_empty() {
            return Err(QuestionError::EmptyText);
        }
        let correct_answer = decode_entities(correct_answer.as_ref());
        if correct_answer.trim().is_empty() {
            return Err(QuestionError::EmptyCorrectAnswer);
        }
        let incorrect_answers: Vec<String> = incorrect_answers
            .into_iter()
            .map(|answer| decode_entities(answer.as_ref()))
            .collect();
        if incorrect_answers.len() != INCORRECT_ANSWER_COUNT {
            return Err(QuestionError::IncorrectAnswerCount {
                expected: INCORRECT_ANSWER_COUNT,
                actual: incorrect_answers.len(),
            });
        }

        Ok(Self {
            text,
            correct_answer,
            incorrect_answers,
            category: decode_entities(category.as_ref()),
        })
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub fn correct_answer(&self) -> &str {
        &self.correct_answer
    }

    #[must_use]
    pub fn incorrect_answers(&self) -> &[String] {
        &self.incorrect_answers
    }

    #[must_use]
    pub fn category(&self) -> &str {
        &self.category
    }

    /// All answers in canonical order: the incorrect ones followed by the correct one.
    ///
    /// Display order is randomized by the caller.
    #[must_use]
    pub fn all_answers(&self) -> Vec<&str> {
        self.incorrect_answers
            .iter()
            .map(String::as_str)
            .chain(std::iter::once(self.correct_answer.as_str()))
            .collect()
    }

    /// Scoring compares strings, never positions.
    #[must_use]
    pub fn is_correct(&self, choice: &str) -> bool {
        choice == self.correct_answer
    }
}

fn decode_entities(raw: &str) -> String {
    html_escape::decode_html_entities(raw).into_owned()
}
