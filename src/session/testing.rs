//! Stand-ins for the PDF reader and model used by the screen tests.

use std::path::Path;

use crate::config::Config;
use crate::generator::{GenerateError, GeneratedQuestion, QuestionGenerator};
use crate::pdf::{PdfError, TextExtractor};
use crate::session::Services;
use crate::store::db::Store;
use crate::store::schema::QuestionType;

pub struct StubExtractor(pub Result<String, String>);

impl TextExtractor for StubExtractor {
    fn extract_text(&self, _path: &Path) -> Result<String, PdfError> {
        self.0.clone().map_err(PdfError::Open)
    }

    fn validate_pdf(&self, _path: &Path) -> Result<(), PdfError> {
        Ok(())
    }
}

pub struct StubGenerator(pub Vec<GeneratedQuestion>);

impl QuestionGenerator for StubGenerator {
    fn generate(
        &self,
        _text: &str,
        count: usize,
        _types: &[QuestionType],
    ) -> Result<Vec<GeneratedQuestion>, GenerateError> {
        if self.0.is_empty() {
            return Err(GenerateError::NoQuestions);
        }
        Ok(self.0.iter().take(count).cloned().collect())
    }
}

pub fn services() -> Services {
    Services {
        store: Store::in_memory().unwrap(),
        extractor: Box::new(StubExtractor(Ok("Some document text".to_string()))),
        generator: Box::new(StubGenerator(Vec::new())),
        config: Config::default(),
        config_path: None,
    }
}
