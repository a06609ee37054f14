use chrono::{DateTime, Utc};
use std::fmt;

use quiz_core::model::{AnswerRecord, GameRecord, GameRecordId, Question};

use super::progress::SessionProgress;
use crate::error::SessionError;

/// Points awarded for each correct answer.
pub const POINTS_PER_CORRECT: u32 = 10;

//
// ─── PHASE ─────────────────────────────────────────────────────────────────────
//

/// Why a session could not get past loading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionFailure {
    /// The question provider failed; carries a user-facing message.
    Fetch(String),
    /// The provider succeeded but returned no questions.
    NoQuestions,
}

impl fmt::Display for SessionFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionFailure::Fetch(message) => write!(f, "Error fetching trivia: {message}"),
            SessionFailure::NoQuestions => write!(f, "No trivia questions are available right now."),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionPhase {
    Loading,
    Active,
    Complete,
    Failed(SessionFailure),
}

/// Identifies the load a fetch was issued for.
///
/// `restart` bumps the session generation, so a fetch that resolves after a
/// restart no longer matches and its result is dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket {
    generation: u64,
}

//
// ─── SESSION ───────────────────────────────────────────────────────────────────
//

/// In-memory state for one playthrough.
///
/// `Loading` → `Active` → `Complete`, with `restart` returning to `Loading` from any
/// phase. Single owner; mutated once per user action.
pub struct QuizSession {
    questions: Vec<Question>,
    current: usize,
    score: u32,
    answers: Vec<AnswerRecord>,
    phase: SessionPhase,
    generation: u64,
    record_id: Option<GameRecordId>,
}

impl Default for QuizSession {
    fn default() -> Self {
        Self::new()
    }
}

impl QuizSession {
    /// Create an empty session waiting for questions.
    #[must_use]
    pub fn new() -> Self {
        Self {
            questions: Vec::new(),
            current: 0,
            score: 0,
            answers: Vec::new(),
            phase: SessionPhase::Loading,
            generation: 0,
            record_id: None,
        }
    }

    #[must_use]
    pub fn phase(&self) -> &SessionPhase {
        &self.phase
    }

    #[must_use]
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    #[must_use]
    pub fn current_index(&self) -> usize {
        self.current
    }

    #[must_use]
    pub fn score(&self) -> u32 {
        self.score
    }

    #[must_use]
    pub fn answers(&self) -> &[AnswerRecord] {
        &self.answers
    }

    /// Id of the archived game once the completion record was persisted.
    #[must_use]
    pub fn record_id(&self) -> Option<GameRecordId> {
        self.record_id
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.phase == SessionPhase::Loading
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.phase == SessionPhase::Active
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.phase == SessionPhase::Complete
    }

    #[must_use]
    pub fn failure(&self) -> Option<&SessionFailure> {
        match &self.phase {
            SessionPhase::Failed(failure) => Some(failure),
            _ => None,
        }
    }

    /// Returns a summary of the current session progress.
    #[must_use]
    pub fn progress(&self) -> SessionProgress {
        SessionProgress {
            total: self.questions.len(),
            answered: self.answers.len(),
            remaining: self.questions.len().saturating_sub(self.current),
            score: self.score,
            is_complete: self.is_complete(),
        }
    }

    /// The question awaiting an answer, if the session is active.
    #[must_use]
    pub fn current_question(&self) -> Option<&Question> {
        if self.is_active() {
            self.questions.get(self.current)
        } else {
            None
        }
    }

    /// Ticket for a fetch issued against the current load.
    #[must_use]
    pub fn load_ticket(&self) -> LoadTicket {
        LoadTicket {
            generation: self.generation,
        }
    }

    /// Whether a fetch issued with `ticket` may still populate this session.
    #[must_use]
    pub fn accepts(&self, ticket: LoadTicket) -> bool {
        self.is_loading() && ticket.generation == self.generation
    }

    /// Populate the session with fetched questions and begin answering.
    ///
    /// An empty batch leaves the session untouched.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NotLoading` outside the loading phase, and
    /// `SessionError::Empty` if `questions` is empty.
    pub fn start(&mut self, questions: Vec<Question>) -> Result<(), SessionError> {
        if !self.is_loading() {
            return Err(SessionError::NotLoading);
        }
        if questions.is_empty() {
            return Err(SessionError::Empty);
        }

        self.questions = questions;
        self.current = 0;
        self.score = 0;
        self.answers.clear();
        self.record_id = None;
        self.phase = SessionPhase::Active;
        Ok(())
    }

    /// Move a loading session into the failed state.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NotLoading` outside the loading phase.
    pub fn fail(&mut self, failure: SessionFailure) -> Result<(), SessionError> {
        if !self.is_loading() {
            return Err(SessionError::NotLoading);
        }
        self.phase = SessionPhase::Failed(failure);
        Ok(())
    }

    /// Score `choice` against the current question and advance.
    ///
    /// Not idempotent: every call consumes one question.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NotActive` if there is no question to answer.
    pub fn submit_answer(&mut self, choice: &str) -> Result<&AnswerRecord, SessionError> {
        if !self.is_active() {
            return Err(SessionError::NotActive);
        }
        let question = self
            .questions
            .get(self.current)
            .ok_or(SessionError::NotActive)?;

        let was_correct = question.is_correct(choice);
        if was_correct {
            self.score += POINTS_PER_CORRECT;
        }
        self.answers.push(AnswerRecord::new(
            question.text(),
            choice,
            was_correct,
            self.score,
        ));

        if self.current + 1 >= self.questions.len() {
            self.current = self.questions.len();
            self.phase = SessionPhase::Complete;
        } else {
            self.current += 1;
        }

        self.answers.last().ok_or(SessionError::NotActive)
    }

    /// Discard all in-memory state and wait for a fresh batch of questions.
    pub fn restart(&mut self) {
        self.questions.clear();
        self.current = 0;
        self.score = 0;
        self.answers.clear();
        self.record_id = None;
        self.phase = SessionPhase::Loading;
        self.generation = self.generation.wrapping_add(1);
    }

    /// Snapshot the finished game for the history log.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NotComplete` before the last answer, or
    /// `SessionError::Record` if the snapshot is inconsistent.
    pub fn build_record(&self, completed_at: DateTime<Utc>) -> Result<GameRecord, SessionError> {
        if !self.is_complete() {
            return Err(SessionError::NotComplete);
        }
        Ok(GameRecord::from_session(
            completed_at,
            self.score,
            &self.questions,
            &self.answers,
        )?)
    }

    pub(crate) fn set_record_id(&mut self, id: GameRecordId) {
        self.record_id = Some(id);
    }
}

impl fmt::Debug for QuizSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QuizSession")
            .field("phase", &self.phase)
            .field("questions_len", &self.questions.len())
            .field("current", &self.current)
            .field("score", &self.score)
            .field("answers_len", &self.answers.len())
            .field("generation", &self.generation)
            .field("record_id", &self.record_id)
            .finish()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::time::fixed_now;

    fn question(n: usize) -> Question {
        Question::new(
            format!("Question {n}?"),
            format!("right {n}"),
            [format!("wrong {n}a"), format!("wrong {n}b"), format!("wrong {n}c")],
            "General Knowledge",
        )
        .unwrap()
    }

    fn questions(count: usize) -> Vec<Question> {
        (1..=count).map(question).collect()
    }

    fn assert_score_invariant(session: &QuizSession) {
        let correct = session.answers().iter().filter(|a| a.was_correct).count();
        assert_eq!(session.score(), POINTS_PER_CORRECT * correct as u32);
    }

    #[test]
    fn new_session_is_loading() {
        let session = QuizSession::new();
        assert!(session.is_loading());
        assert!(session.current_question().is_none());
        assert_eq!(session.progress().total, 0);
    }

    #[test]
    fn start_activates_session() {
        let mut session = QuizSession::new();
        session.start(questions(5)).unwrap();

        assert!(session.is_active());
        assert_eq!(session.current_index(), 0);
        assert_eq!(session.score(), 0);
        assert_eq!(session.current_question().unwrap().text(), "Question 1?");
    }

    #[test]
    fn start_with_no_questions_is_a_no_op() {
        let mut session = QuizSession::new();
        let err = session.start(Vec::new()).unwrap_err();
        assert!(matches!(err, SessionError::Empty));
        assert!(session.is_loading());
    }

    #[test]
    fn start_requires_loading_phase() {
        let mut session = QuizSession::new();
        session.start(questions(2)).unwrap();
        let err = session.start(questions(2)).unwrap_err();
        assert!(matches!(err, SessionError::NotLoading));
    }

    #[test]
    fn correct_answer_adds_ten_points() {
        let mut session = QuizSession::new();
        session.start(questions(3)).unwrap();

        let answer = session.submit_answer("right 1").unwrap().clone();
        assert!(answer.was_correct);
        assert_eq!(answer.score_after, 10);
        assert_eq!(answer.question_text, "Question 1?");

        let answer = session.submit_answer("wrong 2a").unwrap().clone();
        assert!(!answer.was_correct);
        assert_eq!(answer.score_after, 10);
        assert_score_invariant(&session);
    }

    #[test]
    fn answers_track_index_until_complete() {
        let mut session = QuizSession::new();
        session.start(questions(5)).unwrap();

        for n in 1..=5 {
            assert!(session.is_active());
            assert_eq!(session.answers().len(), session.current_index());
            session.submit_answer(&format!("right {n}")).unwrap();
            assert_score_invariant(&session);
        }

        assert!(session.is_complete());
        assert_eq!(session.answers().len(), session.questions().len());
        assert_eq!(session.current_index(), 5);
        assert_eq!(session.score(), 50);
        assert!(session.progress().is_complete);
        assert_eq!(session.progress().remaining, 0);
    }

    #[test]
    fn submit_rejected_when_not_active() {
        let mut session = QuizSession::new();
        assert!(matches!(
            session.submit_answer("x").unwrap_err(),
            SessionError::NotActive
        ));

        session.start(questions(1)).unwrap();
        session.submit_answer("right 1").unwrap();
        assert!(matches!(
            session.submit_answer("right 1").unwrap_err(),
            SessionError::NotActive
        ));
        assert_eq!(session.answers().len(), 1);
    }

    #[test]
    fn restart_discards_state_and_invalidates_tickets() {
        let mut session = QuizSession::new();
        let ticket = session.load_ticket();
        assert!(session.accepts(ticket));

        session.start(questions(3)).unwrap();
        session.submit_answer("right 1").unwrap();
        session.restart();

        assert!(session.is_loading());
        assert!(session.answers().is_empty());
        assert!(session.questions().is_empty());
        assert_eq!(session.score(), 0);
        assert!(!session.accepts(ticket));
        assert!(session.accepts(session.load_ticket()));
    }

    #[test]
    fn fail_only_from_loading() {
        let mut session = QuizSession::new();
        session.fail(SessionFailure::NoQuestions).unwrap();
        assert_eq!(session.failure(), Some(&SessionFailure::NoQuestions));
        assert!(!session.accepts(session.load_ticket()));

        session.restart();
        session.start(questions(1)).unwrap();
        assert!(session.fail(SessionFailure::NoQuestions).is_err());
        assert!(session.is_active());
    }

    #[test]
    fn build_record_requires_completion() {
        let mut session = QuizSession::new();
        session.start(questions(2)).unwrap();
        session.submit_answer("right 1").unwrap();
        assert!(matches!(
            session.build_record(fixed_now()).unwrap_err(),
            SessionError::NotComplete
        ));

        session.submit_answer("wrong 2b").unwrap();
        let record = session.build_record(fixed_now()).unwrap();
        assert_eq!(record.score(), 10);
        assert_eq!(record.chosen_answers(), ["right 1", "wrong 2b"]);
        assert_eq!(record.correct_answers(), ["right 1", "right 2"]);
    }

    #[test]
    fn failure_message_is_user_facing() {
        let failure = SessionFailure::Fetch("timeout".into());
        assert_eq!(failure.to_string(), "Error fetching trivia: timeout");
    }
}
