use std::sync::Arc;

use storage::repository::Storage;

use crate::Clock;
use crate::error::AppServicesError;
use crate::history_service::HistoryService;
use crate::sessions::QuizLoopService;
use crate::trivia_client::{OpenTriviaClient, QuestionProvider, QuestionRequest, TriviaApiConfig};

/// Assembles app-facing services over one storage backend.
#[derive(Clone)]
pub struct AppServices {
    quiz_loop: Arc<QuizLoopService>,
    history: Arc<HistoryService>,
}

impl AppServices {
    /// Build services backed by `SQLite` storage and the Open Trivia DB client.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if storage initialization fails.
    pub async fn new_sqlite(
        db_url: &str,
        clock: Clock,
        trivia: &TriviaApiConfig,
    ) -> Result<Self, AppServicesError> {
        let storage = Storage::sqlite(db_url).await?;
        let provider: Arc<dyn QuestionProvider> = Arc::new(OpenTriviaClient::from_config(trivia));
        Ok(Self::from_parts(
            &storage,
            clock,
            provider,
            trivia.request.clone(),
        ))
    }

    /// Build services from an existing storage aggregate and question provider.
    #[must_use]
    pub fn from_parts(
        storage: &Storage,
        clock: Clock,
        provider: Arc<dyn QuestionProvider>,
        request: QuestionRequest,
    ) -> Self {
        let quiz_loop = Arc::new(
            QuizLoopService::new(
                clock,
                provider,
                Arc::clone(&storage.history),
                Arc::clone(&storage.answers),
            )
            .with_request(request),
        );
        let history = Arc::new(HistoryService::new(Arc::clone(&storage.history)));
        Self { quiz_loop, history }
    }

    #[must_use]
    pub fn quiz_loop(&self) -> Arc<QuizLoopService> {
        Arc::clone(&self.quiz_loop)
    }

    #[must_use]
    pub fn history(&self) -> Arc<HistoryService> {
        Arc::clone(&self.history)
    }
}
