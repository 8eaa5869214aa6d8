use crossterm::event::{KeyCode, KeyEvent};

use crate::session::{Message, Nav, Services, is_confirm, is_down, is_up, require_len, step_cursor};
use crate::store::schema::{NewQuestion, OPTION_LETTERS, QuestionType};
use crate::ui::line_input::{InputResult, LineInput};

pub const DEFAULT_TEST_NAME: &str = "Custom Test";
pub const DEFAULT_TEST_DESCRIPTION: &str = "Custom created test";

const MIN_QUESTION_CHARS: usize = 5;
const QUESTION_ROWS: usize = 5;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CustomStep {
    TestInfo,
    Questions,
    Review,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Field {
    TestName,
    TestDescription,
    QuestionText,
    Option(usize),
    Answer,
    Explanation,
}

impl Field {
    pub fn prompt(self) -> String {
        match self {
            Field::TestName => "Enter test name:".to_string(),
            Field::TestDescription => "Enter test description:".to_string(),
            Field::QuestionText => "Enter question text:".to_string(),
            Field::Option(i) => format!("Enter option {}:", OPTION_LETTERS[i]),
            Field::Answer => "Enter correct answer:".to_string(),
            Field::Explanation => "Enter explanation (optional):".to_string(),
        }
    }
}

/// The question currently being written.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Draft {
    pub kind: QuestionType,
    pub text: String,
    pub options: Vec<String>,
    pub answer: String,
    pub explanation: String,
}

impl Draft {
    pub fn new(kind: QuestionType) -> Self {
        Self {
            kind,
            options: empty_options(kind),
            ..Self::default()
        }
    }

    pub fn filled_options(&self) -> usize {
        self.options.iter().filter(|o| !o.trim().is_empty()).count()
    }

    fn validate(&self) -> Result<NewQuestion, String> {
        if self.text.trim().is_empty() {
            return Err("Question text is required".to_string());
        }
        if self.answer.trim().is_empty() {
            return Err("Correct answer is required".to_string());
        }

        let mut answer = self.answer.trim().to_string();
        let mut options = Vec::new();
        if self.kind == QuestionType::MultipleChoice {
            if self.filled_options() < 2 {
                return Err("Multiple choice questions need at least 2 options".to_string());
            }
            let picked = OPTION_LETTERS
                .iter()
                .position(|&l| l == answer.to_uppercase())
                .filter(|&i| self.options.get(i).is_some_and(|o| !o.trim().is_empty()));
            let Some(picked) = picked else {
                return Err("Correct answer must be the letter of a filled option (A-D)".to_string());
            };
            // Blank slots are dropped, so the answer letter follows its option.
            let shift = self.options[..picked]
                .iter()
                .filter(|o| o.trim().is_empty())
                .count();
            answer = OPTION_LETTERS[picked - shift].to_string();
            options = self
                .options
                .iter()
                .map(|o| o.trim())
                .filter(|o| !o.is_empty())
                .map(str::to_string)
                .collect();
        }

        Ok(NewQuestion {
            question_text: self.text.trim().to_string(),
            question_type: self.kind,
            options,
            correct_answer: answer,
            explanation: self.explanation.trim().to_string(),
        })
    }
}

fn empty_options(kind: QuestionType) -> Vec<String> {
    match kind {
        QuestionType::MultipleChoice => vec![String::new(); OPTION_LETTERS.len()],
        QuestionType::TrueFalse | QuestionType::ShortAnswer => Vec::new(),
    }
}

pub struct CustomWizard {
    pub step: CustomStep,
    pub cursor: usize,
    pub name: String,
    pub description: String,
    pub draft: Draft,
    pub questions: Vec<NewQuestion>,
    pub editor: Option<(Field, LineInput)>,
    pub message: Option<Message>,
}

impl Default for CustomWizard {
    fn default() -> Self {
        Self::new()
    }
}

impl CustomWizard {
    pub fn new() -> Self {
        Self {
            step: CustomStep::TestInfo,
            cursor: 0,
            name: DEFAULT_TEST_NAME.to_string(),
            description: DEFAULT_TEST_DESCRIPTION.to_string(),
            draft: Draft::new(QuestionType::MultipleChoice),
            questions: Vec::new(),
            editor: None,
            message: None,
        }
    }

    pub fn is_editing(&self) -> bool {
        self.editor.is_some()
    }

    pub fn handle_key(&mut self, key: KeyEvent, svc: &mut Services) -> Nav {
        self.message = None;

        if self.editor.is_some() {
            self.handle_editor_key(key);
            return Nav::Stay;
        }

        match self.step {
            CustomStep::TestInfo => self.handle_info_key(key),
            CustomStep::Questions => self.handle_question_key(key),
            CustomStep::Review => {
                if is_confirm(&key) {
                    return self.save(svc);
                }
                if key.code == KeyCode::Char('b') {
                    self.step = CustomStep::Questions;
                    self.cursor = 0;
                }
            }
        }
        Nav::Stay
    }

    fn handle_info_key(&mut self, key: KeyEvent) {
        if is_up(&key) || is_down(&key) {
            step_cursor(&mut self.cursor, 2, is_down(&key));
            return;
        }
        if is_confirm(&key) {
            self.step = CustomStep::Questions;
            self.cursor = 0;
            return;
        }
        match (key.code, self.cursor) {
            (KeyCode::Char('n'), 0) => self.open_editor(Field::TestName),
            (KeyCode::Char('d'), 1) => self.open_editor(Field::TestDescription),
            _ => {}
        }
    }

    fn handle_question_key(&mut self, key: KeyEvent) {
        if is_up(&key) || is_down(&key) {
            step_cursor(&mut self.cursor, QUESTION_ROWS, is_down(&key));
            return;
        }
        match (key.code, self.cursor) {
            (KeyCode::Char('t'), 0) => self.cycle_type(),
            (KeyCode::Char('q'), 1) => self.open_editor(Field::QuestionText),
            (KeyCode::Char('o'), 2) if self.draft.kind == QuestionType::MultipleChoice => {
                self.open_editor(Field::Option(0));
            }
            (KeyCode::Char('a'), 3) => self.open_editor(Field::Answer),
            (KeyCode::Char('e'), 4) => self.open_editor(Field::Explanation),
            (KeyCode::Char('s'), _) => self.save_draft(),
            (KeyCode::Char('f'), _) => {
                if self.questions.is_empty() {
                    self.message = Some(Message::error("Create at least one question before finishing"));
                } else {
                    self.step = CustomStep::Review;
                    self.cursor = 0;
                }
            }
            _ => {}
        }
    }

    /// Next type in the fixed order; clears the option slots.
    pub fn cycle_type(&mut self) {
        self.draft.kind = self.draft.kind.next();
        self.draft.options = empty_options(self.draft.kind);
    }

    fn current_value(&self, field: Field) -> &str {
        match field {
            Field::TestName => &self.name,
            Field::TestDescription => &self.description,
            Field::QuestionText => &self.draft.text,
            Field::Option(i) => self.draft.options.get(i).map_or("", String::as_str),
            Field::Answer => &self.draft.answer,
            Field::Explanation => &self.draft.explanation,
        }
    }

    fn open_editor(&mut self, field: Field) {
        let input = LineInput::new(self.current_value(field));
        self.editor = Some((field, input));
    }

    fn handle_editor_key(&mut self, key: KeyEvent) {
        let Some((field, input)) = self.editor.as_mut() else {
            return;
        };
        match input.handle(key) {
            InputResult::Continue => {}
            InputResult::Cancel => self.editor = None,
            InputResult::Submit => {
                let field = *field;
                let value = input.value().to_string();
                self.editor = None;
                self.commit(field, &value);
            }
        }
    }

    fn commit(&mut self, field: Field, value: &str) {
        let result = match field {
            Field::TestName => require_len(value, 1).map(|v| self.name = v),
            Field::TestDescription => {
                self.description = value.trim().to_string();
                Ok(())
            }
            Field::QuestionText => require_len(value, MIN_QUESTION_CHARS).map(|v| self.draft.text = v),
            Field::Answer => require_len(value, 1).map(|v| self.draft.answer = v),
            Field::Explanation => {
                self.draft.explanation = value.trim().to_string();
                Ok(())
            }
            Field::Option(i) => require_len(value, 1).map(|v| {
                if let Some(slot) = self.draft.options.get_mut(i) {
                    *slot = v;
                }
                if i + 1 < self.draft.options.len() {
                    self.open_editor(Field::Option(i + 1));
                }
            }),
        };
        if let Err(e) = result {
            self.message = Some(Message::error(e));
        }
    }

    pub fn save_draft(&mut self) {
        match self.draft.validate() {
            Ok(question) => {
                self.questions.push(question);
                self.draft = Draft::new(self.draft.kind);
                self.cursor = 0;
                self.message = Some(Message::info(format!(
                    "Question saved! ({} total)",
                    self.questions.len()
                )));
            }
            Err(e) => self.message = Some(Message::error(e)),
        }
    }

    /// Writes the test and then each question in order. Stops at the first
    /// failed insert; rows written before it stay.
    fn save(&mut self, svc: &mut Services) -> Nav {
        if self.questions.is_empty() {
            self.message = Some(Message::error("No questions to save"));
            return Nav::Stay;
        }

        let test = match svc.store.create_test(&self.name, &self.description) {
            Ok(test) => test,
            Err(e) => {
                tracing::error!(error = %e, "failed to create custom test");
                self.message = Some(Message::error(format!("Failed to create test: {e}")));
                return Nav::Stay;
            }
        };
        for question in &self.questions {
            if let Err(e) = svc.store.create_question(test.id, question) {
                tracing::error!(test_id = test.id, error = %e, "failed to save custom question");
                self.message = Some(Message::error(format!("Failed to save question: {e}")));
                return Nav::Stay;
            }
        }

        tracing::info!(test_id = test.id, questions = self.questions.len(), "custom test saved");
        Nav::Menu(Some(Message::info(format!(
            "Saved '{}' with {} questions",
            test.name,
            self.questions.len()
        ))))
    }
}
