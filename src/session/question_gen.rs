use crossterm::event::{KeyCode, KeyEvent};

use crate::session::pdf_wizard::{PdfWizard, WizardStep};
use crate::session::{Message, Nav, Services};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GenStatus {
    Generating,
    Failed(String),
}

/// Status screen for a generation request. Holds the wizard that started it
/// so a failed run can go back to the Generate step with its settings intact.
pub struct QuestionGen {
    pub wizard: PdfWizard,
    pub status: GenStatus,
    pub requested: usize,
}

impl QuestionGen {
    pub fn start(wizard: PdfWizard) -> Self {
        let requested = wizard.count;
        Self {
            wizard,
            status: GenStatus::Generating,
            requested,
        }
    }

    pub fn is_generating(&self) -> bool {
        self.status == GenStatus::Generating
    }

    pub fn run(&mut self, svc: &Services) -> Nav {
        match self.wizard.generate_and_save(svc) {
            Ok((test, count)) => Nav::Menu(Some(Message::info(format!(
                "Successfully generated {count} questions for '{}'!",
                test.name
            )))),
            Err(e) => {
                tracing::warn!(error = %e, "question generation failed");
                self.status = GenStatus::Failed(e);
                Nav::Stay
            }
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Nav {
        if self.is_generating() {
            return Nav::Stay;
        }
        match key.code {
            KeyCode::Char('q') => Nav::Menu(None),
            KeyCode::Char('r') => Nav::RetryGeneration,
            _ => Nav::Stay,
        }
    }

    pub fn into_wizard(self) -> PdfWizard {
        let mut wizard = self.wizard;
        wizard.step = WizardStep::Generate;
        wizard.message = None;
        wizard
    }
}
