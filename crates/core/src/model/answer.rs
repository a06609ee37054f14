/// Outcome of a single answer submission within a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerRecord {
    pub question_text: String,
    pub chosen_answer: String,
    pub was_correct: bool,
    pub score_after: u32,
}

impl AnswerRecord {
    #[must_use]
    pub fn new(
        question_text: impl Into<String>,
        chosen_answer: impl Into<String>,
        was_correct: bool,
        score_after: u32,
    ) -> Self {
        Self {
            question_text: question_text.into(),
            chosen_answer: chosen_answer.into(),
            was_correct,
            score_after,
        }
    }

    /// Line for the answer audit trail: `question:answer:correct:score`.
    #[must_use]
    pub fn audit_line(&self) -> String {
        format!(
            "{}:{}:{}:{}",
            self.question_text, self.chosen_answer, self.was_correct, self.score_after
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn audit_line_joins_with_colons() {
        let record = AnswerRecord::new("Capital of France?", "Paris", true, 10);
        assert_eq!(record.audit_line(), "Capital of France?:Paris:true:10");
    }
}
