use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const OPTION_LETTERS: [&str; 4] = ["A", "B", "C", "D"];

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionType {
    #[default]
    MultipleChoice,
    TrueFalse,
    ShortAnswer,
}

impl QuestionType {
    /// Fixed cycle order shared by both wizards.
    pub const ALL: [QuestionType; 3] = [
        QuestionType::MultipleChoice,
        QuestionType::TrueFalse,
        QuestionType::ShortAnswer,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            QuestionType::MultipleChoice => "multiple_choice",
            QuestionType::TrueFalse => "true_false",
            QuestionType::ShortAnswer => "short_answer",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            QuestionType::MultipleChoice => "Multiple Choice",
            QuestionType::TrueFalse => "True/False",
            QuestionType::ShortAnswer => "Short Answer",
        }
    }

    pub fn next(self) -> Self {
        match self {
            QuestionType::MultipleChoice => QuestionType::TrueFalse,
            QuestionType::TrueFalse => QuestionType::ShortAnswer,
            QuestionType::ShortAnswer => QuestionType::MultipleChoice,
        }
    }
}

impl fmt::Display for QuestionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QuestionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "multiple_choice" => Ok(QuestionType::MultipleChoice),
            "true_false" => Ok(QuestionType::TrueFalse),
            "short_answer" => Ok(QuestionType::ShortAnswer),
            other => Err(format!("unknown question type: {other}")),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Test {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Question {
    pub id: i64,
    pub test_id: i64,
    pub question_text: String,
    pub question_type: QuestionType,
    /// Only meaningful for multiple choice.
    pub options: Vec<String>,
    pub correct_answer: String,
    pub explanation: String,
    pub created_at: DateTime<Utc>,
}

/// Fields needed to insert a question; the store assigns id and timestamps.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct NewQuestion {
    pub question_text: String,
    pub question_type: QuestionType,
    pub options: Vec<String>,
    pub correct_answer: String,
    pub explanation: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TestResult {
    pub id: i64,
    pub test_id: i64,
    pub score: f64,
    pub total_questions: u32,
    pub correct_answers: u32,
    pub time_taken: u64,
    pub completed_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TestResultWithName {
    pub id: i64,
    pub test_id: i64,
    pub test_name: String,
    pub score: f64,
    pub total_questions: u32,
    pub correct_answers: u32,
    pub time_taken: u64,
    pub completed_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct QuestionAnswer {
    pub id: i64,
    pub result_id: i64,
    pub question_id: i64,
    pub user_answer: String,
    pub is_correct: bool,
}

/// A stored answer joined with the question it belongs to.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct QuestionAnswerDetail {
    pub id: i64,
    pub result_id: i64,
    pub question_id: i64,
    pub question_text: String,
    pub user_answer: String,
    pub correct_answer: String,
    pub is_correct: bool,
    pub explanation: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_question_type_cycle_order() {
        assert_eq!(QuestionType::MultipleChoice.next(), QuestionType::TrueFalse);
        assert_eq!(QuestionType::TrueFalse.next(), QuestionType::ShortAnswer);
        assert_eq!(QuestionType::ShortAnswer.next(), QuestionType::MultipleChoice);
    }

    #[test]
    fn test_question_type_parse() {
        for kind in QuestionType::ALL {
            assert_eq!(kind.as_str().parse::<QuestionType>().unwrap(), kind);
        }
        assert!("essay".parse::<QuestionType>().is_err());
    }
}
