use std::sync::Arc;

use quiz_core::model::{AnswerRecord, GameRecordId, Question};
use storage::repository::{AnswerLogRepository, HistoryRepository};
use tracing::{debug, error, info, warn};

use super::service::{LoadTicket, QuizSession, SessionFailure};
use crate::Clock;
use crate::error::{FetchError, SessionError};
use crate::trivia_client::{QuestionProvider, QuestionRequest};

/// Result of answering a single question in a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionAnswerResult {
    pub answer: AnswerRecord,
    pub is_complete: bool,
    pub record_id: Option<GameRecordId>,
}

/// What happened to a fetch result handed back to a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// Questions were accepted and the session is active.
    Started { count: usize },
    /// The session moved to a failed state.
    Failed(SessionFailure),
    /// The session had moved on since the fetch was issued.
    Discarded,
}

/// Orchestrates question loading and persisted answering.
#[derive(Clone)]
pub struct QuizLoopService {
    clock: Clock,
    provider: Arc<dyn QuestionProvider>,
    history: Arc<dyn HistoryRepository>,
    answers: Arc<dyn AnswerLogRepository>,
    request: QuestionRequest,
}

impl QuizLoopService {
    #[must_use]
    pub fn new(
        clock: Clock,
        provider: Arc<dyn QuestionProvider>,
        history: Arc<dyn HistoryRepository>,
        answers: Arc<dyn AnswerLogRepository>,
    ) -> Self {
        Self {
            clock,
            provider,
            history,
            answers,
            request: QuestionRequest::default(),
        }
    }

    #[must_use]
    pub fn with_request(mut self, request: QuestionRequest) -> Self {
        self.request = request;
        self
    }

    /// Owned fetch future that can be moved onto a background task.
    ///
    /// The result must be handed back with `apply_fetch` on the task that owns the
    /// session.
    pub fn fetch_questions(
        &self,
    ) -> impl Future<Output = Result<Vec<Question>, FetchError>> + Send + 'static {
        let provider = Arc::clone(&self.provider);
        let request = self.request.clone();
        async move { provider.fetch_daily_questions(&request).await }
    }

    /// Apply a fetch result to the session it was issued for.
    ///
    /// Results for a session that is no longer loading, or that was restarted
    /// after `ticket` was taken, are dropped.
    pub fn apply_fetch(
        &self,
        session: &mut QuizSession,
        ticket: LoadTicket,
        result: Result<Vec<Question>, FetchError>,
    ) -> FetchOutcome {
        if !session.accepts(ticket) {
            warn!(phase = ?session.phase(), "discarding stale question fetch");
            return FetchOutcome::Discarded;
        }

        let failure = match result {
            Ok(questions) => {
                let count = questions.len();
                match session.start(questions) {
                    Ok(()) => {
                        debug!(count, "session started");
                        return FetchOutcome::Started { count };
                    }
                    Err(_) => SessionFailure::NoQuestions,
                }
            }
            Err(err) => {
                error!(error = %err, "failed to fetch trivia questions");
                SessionFailure::Fetch(err.to_string())
            }
        };

        // `accepts` guarantees the session is still loading.
        let _ = session.fail(failure.clone());
        FetchOutcome::Failed(failure)
    }

    /// Fetch and apply in one step, for callers that own the session across the await.
    pub async fn load(&self, session: &mut QuizSession) -> FetchOutcome {
        let ticket = session.load_ticket();
        let result = self.fetch_questions().await;
        self.apply_fetch(session, ticket, result)
    }

    /// Answer the current question; archive the game when it was the last one.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NotActive` if there is no question to answer, or
    /// `SessionError::Storage` if the completed game could not be archived. In the
    /// latter case the session stays complete and `finalize_record` can retry.
    pub async fn submit_answer(
        &self,
        session: &mut QuizSession,
        choice: &str,
    ) -> Result<SessionAnswerResult, SessionError> {
        let answer = session.submit_answer(choice)?.clone();

        if let Err(err) = self.answers.append_answer(&answer).await {
            warn!(error = %err, "failed to append answer audit line");
        }

        if session.is_complete() && session.record_id().is_none() {
            self.finalize_record(session).await?;
        }

        Ok(SessionAnswerResult {
            answer,
            is_complete: session.is_complete(),
            record_id: session.record_id(),
        })
    }

    /// Persist the completed game, or return the id of the already archived one.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NotComplete` if the session is still running, and
    /// `SessionError::Storage` if persistence fails.
    pub async fn finalize_record(
        &self,
        session: &mut QuizSession,
    ) -> Result<GameRecordId, SessionError> {
        if let Some(id) = session.record_id() {
            return Ok(id);
        }

        let record = session.build_record(self.clock.now())?;
        self.history.append(&record).await?;
        let id = record.id();
        session.set_record_id(id);
        info!(id = %id, score = record.score(), "game archived");
        Ok(id)
    }
}
