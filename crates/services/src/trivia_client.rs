use std::env;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::warn;

use quiz_core::model::Question;

use crate::error::FetchError;

/// Parameters for one batch of daily questions.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QuestionRequest {
    pub amount: u32,
    pub difficulty: String,
    pub kind: String,
}

impl Default for QuestionRequest {
    fn default() -> Self {
        Self {
            amount: 5,
            difficulty: "easy".into(),
            kind: "multiple".into(),
        }
    }
}

/// Source of trivia questions.
#[async_trait]
pub trait QuestionProvider: Send + Sync {
    /// Fetch a batch of decoded questions.
    ///
    /// # Errors
    ///
    /// Returns `FetchError` on network, status, or payload failures.
    async fn fetch_daily_questions(
        &self,
        request: &QuestionRequest,
    ) -> Result<Vec<Question>, FetchError>;
}

#[derive(Clone, Debug)]
pub struct TriviaApiConfig {
    pub base_url: String,
    pub request: QuestionRequest,
}

impl Default for TriviaApiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://opentdb.com".into(),
            request: QuestionRequest::default(),
        }
    }
}

impl TriviaApiConfig {
    /// Read overrides from `TRIVIA_API_BASE_URL`, `TRIVIA_AMOUNT`,
    /// `TRIVIA_DIFFICULTY` and `TRIVIA_TYPE`.
    #[must_use]
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let base_url = env::var("TRIVIA_API_BASE_URL")
            .ok()
            .filter(|value| !value.trim().is_empty())
            .unwrap_or(defaults.base_url);
        let amount = env::var("TRIVIA_AMOUNT")
            .ok()
            .and_then(|value| value.parse::<u32>().ok())
            .filter(|amount| *amount > 0)
            .unwrap_or(defaults.request.amount);
        let difficulty =
            env::var("TRIVIA_DIFFICULTY").unwrap_or(defaults.request.difficulty);
        let kind = question_kind(env::var("TRIVIA_TYPE").ok(), defaults.request.kind);
        Self {
            base_url,
            request: QuestionRequest {
                amount,
                difficulty,
                kind,
            },
        }
    }
}

/// Questions need exactly three distractors, so only `multiple` batches decode.
const SUPPORTED_KIND: &str = "multiple";

fn question_kind(raw: Option<String>, default: String) -> String {
    let Some(kind) = raw.filter(|value| !value.trim().is_empty()) else {
        return default;
    };
    if kind != SUPPORTED_KIND {
        warn!(kind = %kind, "TRIVIA_TYPE is not `multiple`; fetched questions will fail validation");
    }
    kind
}

/// Open Trivia DB client (`GET {base}/api.php`).
#[derive(Clone)]
pub struct OpenTriviaClient {
    client: Client,
    base_url: String,
}

impl OpenTriviaClient {
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
        }
    }

    #[must_use]
    pub fn from_config(config: &TriviaApiConfig) -> Self {
        Self::new(config.base_url.clone())
    }
}

#[async_trait]
impl QuestionProvider for OpenTriviaClient {
    async fn fetch_daily_questions(
        &self,
        request: &QuestionRequest,
    ) -> Result<Vec<Question>, FetchError> {
        let url = format!("{}/api.php", self.base_url.trim_end_matches('/'));
        let response = self
            .client
            .get(url)
            .query(&[
                ("amount", request.amount.to_string()),
                ("difficulty", request.difficulty.clone()),
                ("type", request.kind.clone()),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(FetchError::HttpStatus(response.status()));
        }

        let body: TriviaResponse = response.json().await?;
        body.into_questions()
    }
}

#[derive(Debug, Deserialize)]
struct TriviaResponse {
    response_code: u8,
    #[serde(default)]
    results: Vec<TriviaQuestion>,
}

#[derive(Debug, Deserialize)]
struct TriviaQuestion {
    question: String,
    correct_answer: String,
    incorrect_answers: Vec<String>,
    category: String,
}

impl TriviaResponse {
    fn into_questions(self) -> Result<Vec<Question>, FetchError> {
        if self.response_code != 0 {
            return Err(FetchError::Api(self.response_code));
        }
        self.results
            .into_iter()
            .map(|raw| {
                Question::new(
                    raw.question,
                    raw.correct_answer,
                    raw.incorrect_answers,
                    raw.category,
                )
                .map_err(FetchError::from)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "response_code": 0,
        "results": [
            {
                "type": "multiple",
                "difficulty": "easy",
                "category": "Entertainment: Video Games",
                "question": "In &quot;Portal&quot;, what is GLaDOS&#039; favorite food?",
                "correct_answer": "Cake",
                "incorrect_answers": ["Pie", "Cookies", "Ice Cream"]
            }
        ]
    }"#;

    #[test]
    fn parses_and_decodes_payload() {
        let body: TriviaResponse = serde_json::from_str(SAMPLE).unwrap();
        let questions = body.into_questions().unwrap();

        assert_eq!(questions.len(), 1);
        let q = &questions[0];
        assert_eq!(q.text(), "In \"Portal\", what is GLaDOS' favorite food?");
        assert_eq!(q.correct_answer(), "Cake");
        assert_eq!(q.incorrect_answers(), ["Pie", "Cookies", "Ice Cream"]);
        assert_eq!(q.category(), "Entertainment: Video Games");
    }

    #[test]
    fn non_zero_response_code_is_an_error() {
        let body: TriviaResponse =
            serde_json::from_str(r#"{"response_code": 5, "results": []}"#).unwrap();
        let err = body.into_questions().unwrap_err();
        assert!(matches!(err, FetchError::Api(5)));
    }

    #[test]
    fn empty_results_are_not_an_error_here() {
        let body: TriviaResponse = serde_json::from_str(r#"{"response_code": 0}"#).unwrap();
        assert!(body.into_questions().unwrap().is_empty());
    }

    #[test]
    fn question_kind_falls_back_on_blank() {
        assert_eq!(question_kind(None, "multiple".into()), "multiple");
        assert_eq!(question_kind(Some("  ".into()), "multiple".into()), "multiple");
        assert_eq!(question_kind(Some("boolean".into()), "multiple".into()), "boolean");
    }

    #[test]
    fn boolean_payload_fails_validation() {
        let body: TriviaResponse = serde_json::from_str(
            r#"{"response_code": 0, "results": [{
                "category": "Science", "question": "Water is wet?",
                "correct_answer": "True", "incorrect_answers": ["False"]
            }]}"#,
        )
        .unwrap();
        assert!(matches!(
            body.into_questions(),
            Err(FetchError::InvalidQuestion(_))
        ));
    }

    #[test]
    fn default_request_matches_daily_challenge() {
        let request = QuestionRequest::default();
        assert_eq!(request.amount, 5);
        assert_eq!(request.difficulty, "easy");
        assert_eq!(request.kind, "multiple");
    }
}
