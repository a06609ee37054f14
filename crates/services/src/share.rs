//! Plain-text renderings of archived games for list, detail and share surfaces.

use chrono::{DateTime, Utc};

use quiz_core::model::GameRecord;

/// Short date for history rows, e.g. `Tue Nov 14 22:13`.
#[must_use]
pub fn format_list_date(value: DateTime<Utc>) -> String {
    value.format("%a %b %d %H:%M").to_string()
}

/// Full date for detail and share text, e.g. `Tue Nov 14 22:13:20 UTC 2023`.
#[must_use]
pub fn format_full_date(value: DateTime<Utc>) -> String {
    value.format("%a %b %d %H:%M:%S UTC %Y").to_string()
}

/// One history row: `<date> - Score: <n>`.
#[must_use]
pub fn history_line(completed_at: DateTime<Utc>, score: u32) -> String {
    format!("{} - Score: {score}", format_list_date(completed_at))
}

/// Summary handed to a system share sheet.
#[must_use]
pub fn share_text(record: &GameRecord) -> String {
    let mut out = String::from("Game Details:\n");
    out.push_str(&format!("Date: {}\n", format_full_date(record.timestamp())));
    out.push_str(&format!("Score: {}\n", record.score()));
    for (index, (question, chosen, correct)) in record.entries().enumerate() {
        out.push_str(&format!("Question {}: {question}\n", index + 1));
        out.push_str(&format!("Answer: {chosen}\n"));
        out.push_str(&format!("Correct Answer: {correct}\n"));
    }
    out
}

/// Detail view text, numbering each question against the game length.
#[must_use]
pub fn detail_text(record: &GameRecord) -> String {
    let total = record.len();
    let mut out = String::from("Game Details\n\n");
    out.push_str(&format!("Date: {}\n", format_full_date(record.timestamp())));
    out.push_str(&format!("Score: {}\n", record.score()));
    for (index, (question, chosen, correct)) in record.entries().enumerate() {
        out.push_str(&format!("\n{}/{total} Question:\n", index + 1));
        out.push_str(&format!("    Question: {question}\n"));
        out.push_str(&format!("    Your answer: {chosen}\n"));
        out.push_str(&format!("    Correct answer: {correct}\n"));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::time::fixed_now;

    fn record() -> GameRecord {
        GameRecord::from_persisted(
            fixed_now(),
            10,
            vec!["Capital of Peru?".into(), "2 + 2?".into()],
            vec!["Lima".into(), "5".into()],
            vec!["Lima".into(), "4".into()],
        )
        .unwrap()
    }

    #[test]
    fn share_text_lists_every_question() {
        let text = share_text(&record());
        assert_eq!(
            text,
            "Game Details:\n\
             Date: Tue Nov 14 22:13:20 UTC 2023\n\
             Score: 10\n\
             Question 1: Capital of Peru?\n\
             Answer: Lima\n\
             Correct Answer: Lima\n\
             Question 2: 2 + 2?\n\
             Answer: 5\n\
             Correct Answer: 4\n"
        );
    }

    #[test]
    fn history_line_uses_short_date() {
        assert_eq!(history_line(fixed_now(), 30), "Tue Nov 14 22:13 - Score: 30");
    }

    #[test]
    fn detail_text_numbers_questions() {
        let text = detail_text(&record());
        assert!(text.contains("1/2 Question:"));
        assert!(text.contains("2/2 Question:"));
        assert!(text.contains("    Your answer: 5"));
        assert!(text.contains("    Correct answer: 4"));
    }
}
