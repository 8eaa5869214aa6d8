use std::collections::HashMap;
use std::time::Duration;

use crate::store::schema::{Question, QuestionType};

/// Percentage of correct answers; zero questions scores zero.
pub fn score_percent(correct: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    correct as f64 / total as f64 * 100.0
}

pub fn grade(percent: f64) -> &'static str {
    if percent >= 90.0 {
        "A"
    } else if percent >= 80.0 {
        "B"
    } else if percent >= 70.0 {
        "C"
    } else if percent >= 60.0 {
        "D"
    } else {
        "F"
    }
}

/// Scoring comparison. Multiple choice is an exact letter match; the other
/// types ignore case and surrounding whitespace.
pub fn answer_matches(kind: QuestionType, user: &str, correct: &str) -> bool {
    match kind {
        QuestionType::MultipleChoice => user.trim() == correct.trim(),
        QuestionType::TrueFalse | QuestionType::ShortAnswer => {
            user.trim().to_lowercase() == correct.trim().to_lowercase()
        }
    }
}

/// Comparison used when paging through answers after a test.
pub fn review_matches(user: &str, correct: &str) -> bool {
    user.to_lowercase() == correct.to_lowercase()
}

/// Returns (correct, score). Unanswered questions count against the score.
pub fn tally(questions: &[Question], answers: &HashMap<i64, String>) -> (usize, f64) {
    let correct = questions
        .iter()
        .filter(|q| {
            answers
                .get(&q.id)
                .is_some_and(|a| answer_matches(q.question_type, a, &q.correct_answer))
        })
        .count();
    (correct, score_percent(correct, questions.len()))
}

pub fn format_duration(elapsed: Duration) -> String {
    let secs = elapsed.as_secs();
    format!("{}:{:02}", secs / 60, secs % 60)
}
