mod choices;
mod progress;
mod service;
mod workflow;

// Public API of the session subsystem.
pub use crate::error::SessionError;
pub use choices::{shuffled_choices, shuffled_choices_with};
pub use progress::SessionProgress;
pub use service::{LoadTicket, POINTS_PER_CORRECT, QuizSession, SessionFailure, SessionPhase};
pub use workflow::{FetchOutcome, QuizLoopService, SessionAnswerResult};
