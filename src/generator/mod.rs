pub mod openai;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::store::schema::{NewQuestion, QuestionType};

pub use openai::OpenAiGenerator;

#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("no OpenAI API key configured; set OPENAI_API_KEY to enable generation")]
    MissingApiKey,
    #[error("request failed: {0}")]
    Http(String),
    #[error("OpenAI API error {status}: {body}")]
    Api { status: u16, body: String },
    #[error("invalid response from model: {0}")]
    InvalidResponse(String),
    #[error("the model returned no usable questions")]
    NoQuestions,
}

/// One question as produced by the model, already normalised.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GeneratedQuestion {
    pub question: String,
    #[serde(rename = "type")]
    pub kind: QuestionType,
    pub options: Vec<String>,
    pub correct_answer: String,
    pub explanation: String,
}

impl GeneratedQuestion {
    pub fn to_new_question(&self) -> NewQuestion {
        NewQuestion {
            question_text: self.question.clone(),
            question_type: self.kind,
            options: self.options.clone(),
            correct_answer: self.correct_answer.clone(),
            explanation: self.explanation.clone(),
        }
    }
}

pub trait QuestionGenerator {
    /// Returns at most `count` questions, in the order the model produced them.
    fn generate(
        &self,
        text: &str,
        count: usize,
        types: &[QuestionType],
    ) -> Result<Vec<GeneratedQuestion>, GenerateError>;

    fn is_enabled(&self) -> bool {
        true
    }
}
