use std::sync::Arc;

use async_trait::async_trait;
use quiz_core::model::Question;
use quiz_core::time::fixed_now;
use services::{
    AppServices, Clock, FetchError, QuestionProvider, QuestionRequest, QuizSession,
};
use storage::repository::Storage;

struct OneQuestion;

#[async_trait]
impl QuestionProvider for OneQuestion {
    async fn fetch_daily_questions(
        &self,
        _request: &QuestionRequest,
    ) -> Result<Vec<Question>, FetchError> {
        Ok(vec![
            Question::new(
                "Tom &amp; Jerry: which one is the cat?",
                "Tom",
                ["Jerry", "Spike", "Tyke"],
                "Entertainment: Cartoon &amp; Animations",
            )
            .unwrap(),
        ])
    }
}

#[tokio::test]
async fn completed_game_is_browsable_and_shareable() {
    let storage = Storage::in_memory();
    let services = AppServices::from_parts(
        &storage,
        Clock::fixed(fixed_now()),
        Arc::new(OneQuestion),
        QuestionRequest::default(),
    );
    let quiz = services.quiz_loop();
    let history = services.history();

    assert!(history.list_recent().await.unwrap().is_empty());

    let mut session = QuizSession::new();
    quiz.load(&mut session).await;
    let result = quiz.submit_answer(&mut session, "Jerry").await.unwrap();
    assert!(result.is_complete);

    let items = history.list_recent().await.unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(Some(items[0].id), result.record_id);
    assert_eq!(items[0].score, 0);

    let record = history.detail(&items[0].key()).await.unwrap().unwrap();
    assert_eq!(record.question_texts()[0], "Tom & Jerry: which one is the cat?");

    let text = history.share_text(&items[0].key()).await.unwrap().unwrap();
    assert!(text.starts_with("Game Details:\n"));
    assert!(text.contains("Answer: Jerry\n"));
    assert!(text.contains("Correct Answer: Tom\n"));

    assert!(history.detail("0").await.unwrap().is_none());
}
