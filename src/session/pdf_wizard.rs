use std::path::PathBuf;

use crossterm::event::{KeyCode, KeyEvent};

use crate::config::{MAX_QUESTION_COUNT, MIN_QUESTION_COUNT};
use crate::generator::GeneratedQuestion;
use crate::pdf::PdfInfo;
use crate::session::{Message, Nav, Services, is_confirm, is_down, is_up, require_len, step_cursor};
use crate::store::schema::{QuestionType, Test};
use crate::store::db::StoreResult;
use crate::ui::line_input::{InputResult, LineInput};

pub const DEFAULT_TEST_NAME: &str = "Generated Test";
pub const DEFAULT_TEST_DESCRIPTION: &str = "Test generated from PDF";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WizardStep {
    Extract,
    Configure,
    Generate,
}

impl WizardStep {
    pub fn number(self) -> usize {
        match self {
            WizardStep::Extract => 1,
            WizardStep::Configure => 2,
            WizardStep::Generate => 3,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConfigField {
    Count,
    Types,
    Name,
    Description,
}

impl ConfigField {
    pub const ALL: [ConfigField; 4] = [
        ConfigField::Count,
        ConfigField::Types,
        ConfigField::Name,
        ConfigField::Description,
    ];

    pub fn prompt(self) -> &'static str {
        match self {
            ConfigField::Count => "Enter number of questions:",
            ConfigField::Types => "",
            ConfigField::Name => "Enter test name:",
            ConfigField::Description => "Enter test description:",
        }
    }
}

/// Question types requested from the generator. The toggle keeps exactly
/// one type enabled, stepping through the fixed type order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TypeSelection {
    enabled: [bool; 3],
}

impl Default for TypeSelection {
    fn default() -> Self {
        Self {
            enabled: [true, false, false],
        }
    }
}

impl TypeSelection {
    pub fn toggle(&mut self) {
        if let Some(i) = self.enabled.iter().position(|&on| on) {
            self.enabled[i] = false;
            self.enabled[(i + 1) % self.enabled.len()] = true;
        }
    }

    pub fn is_enabled(&self, kind: QuestionType) -> bool {
        QuestionType::ALL
            .iter()
            .position(|&k| k == kind)
            .is_some_and(|i| self.enabled[i])
    }

    pub fn enabled(&self) -> Vec<QuestionType> {
        QuestionType::ALL
            .into_iter()
            .zip(self.enabled)
            .filter_map(|(kind, on)| on.then_some(kind))
            .collect()
    }
}

pub struct PdfWizard {
    pub path: PathBuf,
    pub info: Option<PdfInfo>,
    pub step: WizardStep,
    pub text: Option<String>,
    pub count: usize,
    pub types: TypeSelection,
    pub name: String,
    pub description: String,
    pub cursor: usize,
    pub editor: Option<(ConfigField, LineInput)>,
    pub message: Option<Message>,
    /// Extraction is scheduled and runs after the next frame is drawn.
    pub loading: bool,
}

impl PdfWizard {
    pub fn new(path: PathBuf, count: usize) -> Self {
        Self {
            path,
            info: None,
            step: WizardStep::Extract,
            text: None,
            count: count.clamp(MIN_QUESTION_COUNT, MAX_QUESTION_COUNT),
            types: TypeSelection::default(),
            name: DEFAULT_TEST_NAME.to_string(),
            description: DEFAULT_TEST_DESCRIPTION.to_string(),
            cursor: 0,
            editor: None,
            message: None,
            loading: false,
        }
    }

    /// Starts a wizard for a newly picked file, reading its metadata up front.
    pub fn open(path: PathBuf, svc: &Services) -> Self {
        let mut wizard = Self::new(path, svc.config.default_question_count);
        match svc.extractor.pdf_info(&wizard.path) {
            Ok(info) => wizard.info = Some(info),
            Err(e) => {
                tracing::warn!(path = %wizard.path.display(), error = %e, "could not read PDF metadata");
                wizard.message = Some(Message::error(format!("Could not read PDF: {e}")));
            }
        }
        wizard
    }

    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| self.path.display().to_string())
    }

    pub fn is_editing(&self) -> bool {
        self.editor.is_some()
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Nav {
        if self.loading {
            return Nav::Stay;
        }
        self.message = None;

        if self.editor.is_some() {
            self.handle_editor_key(key);
            return Nav::Stay;
        }

        match self.step {
            WizardStep::Extract => {
                if is_confirm(&key) {
                    if self.text.is_some() {
                        self.step = WizardStep::Configure;
                    } else {
                        self.loading = true;
                    }
                }
            }
            WizardStep::Configure => self.handle_configure_key(key),
            WizardStep::Generate => {
                if is_confirm(&key) {
                    if self.types.enabled().is_empty() {
                        self.message = Some(Message::error("Please select at least one question type"));
                        self.step = WizardStep::Configure;
                        return Nav::Stay;
                    }
                    return Nav::StartGeneration;
                }
                if key.code == KeyCode::Char('b') {
                    self.step = WizardStep::Configure;
                }
            }
        }
        Nav::Stay
    }

    fn handle_configure_key(&mut self, key: KeyEvent) {
        if is_up(&key) || is_down(&key) {
            step_cursor(&mut self.cursor, ConfigField::ALL.len(), is_down(&key));
            return;
        }
        if is_confirm(&key) {
            self.step = WizardStep::Generate;
            return;
        }
        let field = ConfigField::ALL[self.cursor];
        match (key.code, field) {
            (KeyCode::Char('n'), ConfigField::Count) => {
                self.editor = Some((field, LineInput::new(&self.count.to_string())));
            }
            (KeyCode::Char('t'), ConfigField::Types) => self.types.toggle(),
            (KeyCode::Char('e'), ConfigField::Name) => {
                self.editor = Some((field, LineInput::new(&self.name)));
            }
            (KeyCode::Char('d'), ConfigField::Description) => {
                self.editor = Some((field, LineInput::new(&self.description)));
            }
            _ => {}
        }
    }

    fn handle_editor_key(&mut self, key: KeyEvent) {
        let Some((field, input)) = self.editor.as_mut() else {
            return;
        };
        match input.handle(key) {
            InputResult::Continue => return,
            InputResult::Cancel => {}
            InputResult::Submit => {
                let field = *field;
                let value = input.value().to_string();
                self.commit(field, &value);
            }
        }
        self.editor = None;
    }

    fn commit(&mut self, field: ConfigField, value: &str) {
        match field {
            ConfigField::Count => match value.trim().parse::<usize>() {
                Ok(n) if (MIN_QUESTION_COUNT..=MAX_QUESTION_COUNT).contains(&n) => self.count = n,
                _ => {
                    self.message = Some(Message::error(format!(
                        "Please enter a valid number between {MIN_QUESTION_COUNT} and {MAX_QUESTION_COUNT}"
                    )))
                }
            },
            ConfigField::Name => match require_len(value, 1) {
                Ok(name) => self.name = name,
                Err(e) => self.message = Some(Message::error(e)),
            },
            ConfigField::Description => self.description = value.trim().to_string(),
            ConfigField::Types => {}
        }
    }

    /// Runs the extraction scheduled by the Extract step.
    pub fn run_extraction(&mut self, svc: &Services) {
        self.loading = false;
        match svc.extractor.extract_text(&self.path) {
            Ok(text) => {
                tracing::info!(path = %self.path.display(), chars = text.chars().count(), "text extracted");
                self.text = Some(text);
                self.step = WizardStep::Configure;
                self.message = Some(Message::info("Text extracted successfully!"));
            }
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "text extraction failed");
                self.message = Some(Message::error(format!("Failed to extract text: {e}")));
            }
        }
    }

    /// Generates questions and stores them as a new test. Questions are
    /// inserted one by one; a failure part-way leaves the earlier rows.
    pub fn generate_and_save(&self, svc: &Services) -> Result<(Test, usize), String> {
        let text = self.text.as_deref().unwrap_or_default();
        let types = self.types.enabled();
        let generated = svc
            .generator
            .generate(text, self.count, &types)
            .map_err(|e| format!("Failed to generate questions: {e}"))?;

        let test = svc
            .store
            .create_test(&self.name, &self.description)
            .map_err(|e| format!("Failed to create test: {e}"))?;
        save_generated(svc, test.id, &generated).map_err(|e| format!("Failed to save question: {e}"))?;
        tracing::info!(test_id = test.id, questions = generated.len(), "generated test saved");
        Ok((test, generated.len()))
    }
}

fn save_generated(svc: &Services, test_id: i64, questions: &[GeneratedQuestion]) -> StoreResult<()> {
    for question in questions {
        svc.store.create_question(test_id, &question.to_new_question())?;
    }
    Ok(())
}
