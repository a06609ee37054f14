mod answer;
mod game_record;
mod ids;
mod question;

pub use ids::{GameRecordId, ParseIdError};

pub use answer::AnswerRecord;
pub use game_record::{GameRecord, GameRecordError};
pub use question::{INCORRECT_ANSWER_COUNT, Question, QuestionError};
