#![forbid(unsafe_code)]

pub mod app_services;
pub mod error;
pub mod history_service;
pub mod sessions;
pub mod share;
pub mod trivia_client;

pub use quiz_core::Clock;
pub use sessions as session;

pub use app_services::AppServices;
pub use error::{AppServicesError, FetchError, HistoryServiceError, SessionError};
pub use history_service::{GameHistoryListItem, HistoryService};
pub use trivia_client::{OpenTriviaClient, QuestionProvider, QuestionRequest, TriviaApiConfig};

pub use sessions::{
    FetchOutcome, LoadTicket, QuizLoopService, QuizSession, SessionAnswerResult, SessionFailure,
    SessionPhase, SessionProgress,
};
