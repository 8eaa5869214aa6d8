use std::mem;

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::session::custom_wizard::{CustomStep, CustomWizard};
use crate::session::file_select::FileBrowser;
use crate::session::menu::{MainMenu, MenuChoice};
use crate::session::pdf_wizard::{PdfWizard, WizardStep};
use crate::session::question_gen::QuestionGen;
use crate::session::results::{ResultsBrowser, ResultsView};
use crate::session::test_run::{RunMode, TestRun};
use crate::session::test_select::{SelectPurpose, TestSelect};
use crate::session::{Message, Nav, Services};
use crate::ui::theme::Theme;

/// The active screen. Each variant owns the state it needs; leaving a screen
/// drops it, except the file browser which lives on `App`.
pub enum Screen {
    MainMenu,
    FileSelection,
    PdfProcess(PdfWizard),
    QuestionGen(QuestionGen),
    CustomQuestion(CustomWizard),
    TestSelection(TestSelect),
    TestTaking(TestRun),
    TestResults(ResultsBrowser),
}

impl Screen {
    pub fn name(&self) -> &'static str {
        match self {
            Screen::MainMenu => "main_menu",
            Screen::FileSelection => "file_selection",
            Screen::PdfProcess(_) => "pdf_process",
            Screen::QuestionGen(_) => "question_gen",
            Screen::CustomQuestion(_) => "custom_question",
            Screen::TestSelection(_) => "test_selection",
            Screen::TestTaking(_) => "test_taking",
            Screen::TestResults(_) => "test_results",
        }
    }
}

pub struct App {
    pub screen: Screen,
    pub menu: MainMenu,
    pub files: FileBrowser,
    pub services: Services,
    pub theme: Theme,
    pub should_quit: bool,
}

impl App {
    pub fn new(services: Services, theme: Theme) -> Self {
        let files = FileBrowser::new(services.config.pdf_dir.clone());
        Self {
            screen: Screen::MainMenu,
            menu: MainMenu::new(),
            files,
            services,
            theme,
            should_quit: false,
        }
    }

    /// True while a collaborator call is scheduled for the next loop turn.
    pub fn is_busy(&self) -> bool {
        match &self.screen {
            Screen::PdfProcess(wizard) => wizard.loading,
            Screen::QuestionGen(generation) => generation.is_generating(),
            _ => false,
        }
    }

    /// True when a line editor has focus, so Esc belongs to the editor.
    fn is_editing(&self) -> bool {
        match &self.screen {
            Screen::FileSelection => self.files.is_editing(),
            Screen::PdfProcess(wizard) => wizard.is_editing(),
            Screen::CustomQuestion(wizard) => wizard.is_editing(),
            _ => false,
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        if key.kind != KeyEventKind::Press {
            return;
        }
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.should_quit = true;
            return;
        }
        if self.is_busy() {
            return;
        }
        if key.code == KeyCode::Esc && !matches!(self.screen, Screen::MainMenu) && !self.is_editing()
        {
            self.go_to_menu(None);
            return;
        }

        if matches!(self.screen, Screen::MainMenu) {
            if let Some(choice) = self.menu.handle_key(key) {
                self.choose(choice);
            }
            return;
        }

        let svc = &mut self.services;
        let nav = match &mut self.screen {
            Screen::MainMenu => Nav::Stay,
            Screen::FileSelection => self.files.handle_key(key, svc),
            Screen::PdfProcess(wizard) => wizard.handle_key(key),
            Screen::QuestionGen(generation) => generation.handle_key(key),
            Screen::CustomQuestion(wizard) => wizard.handle_key(key, svc),
            Screen::TestSelection(select) => select.handle_key(key, svc),
            Screen::TestTaking(run) => run.handle_key(key, svc),
            Screen::TestResults(browser) => browser.handle_key(key, svc),
        };
        self.apply(nav);
    }

    /// Runs the job a handler scheduled, after the loop has drawn a frame
    /// showing that it is in progress.
    pub fn run_pending(&mut self) {
        let nav = match &mut self.screen {
            Screen::PdfProcess(wizard) if wizard.loading => {
                wizard.run_extraction(&self.services);
                Nav::Stay
            }
            Screen::QuestionGen(generation) if generation.is_generating() => {
                generation.run(&self.services)
            }
            _ => return,
        };
        self.apply(nav);
    }

    /// `handle_key` followed by any job it scheduled.
    pub fn press(&mut self, key: KeyEvent) {
        self.handle_key(key);
        self.run_pending();
    }

    fn choose(&mut self, choice: MenuChoice) {
        tracing::debug!(?choice, "menu choice");
        let screen = match choice {
            MenuChoice::GenerateFromPdf => {
                self.files.ensure_loaded();
                Screen::FileSelection
            }
            MenuChoice::CreateCustom => Screen::CustomQuestion(CustomWizard::new()),
            MenuChoice::TakeTest => {
                Screen::TestSelection(TestSelect::open(SelectPurpose::TakeTest, &self.services.store))
            }
            MenuChoice::ViewTests => {
                Screen::TestSelection(TestSelect::open(SelectPurpose::ViewTests, &self.services.store))
            }
            MenuChoice::Exit => {
                self.should_quit = true;
                return;
            }
        };
        self.open(screen);
    }

    fn apply(&mut self, nav: Nav) {
        match nav {
            Nav::Stay => {}
            Nav::Menu(flash) => self.go_to_menu(flash),
            Nav::Quit => self.should_quit = true,
            Nav::Open(screen) => self.open(screen),
            Nav::StartGeneration => {
                if let Screen::PdfProcess(wizard) = mem::replace(&mut self.screen, Screen::MainMenu) {
                    self.open(Screen::QuestionGen(QuestionGen::start(wizard)));
                }
            }
            Nav::RetryGeneration => {
                if let Screen::QuestionGen(generation) =
                    mem::replace(&mut self.screen, Screen::MainMenu)
                {
                    self.open(Screen::PdfProcess(generation.into_wizard()));
                }
            }
        }
    }

    fn open(&mut self, screen: Screen) {
        tracing::debug!(from = self.screen.name(), to = screen.name(), "screen change");
        self.screen = screen;
    }

    pub fn go_to_menu(&mut self, flash: Option<Message>) {
        if !matches!(self.screen, Screen::MainMenu) {
            tracing::debug!(from = self.screen.name(), "back to main menu");
        }
        self.screen = Screen::MainMenu;
        self.menu.flash = flash;
    }

    /// Key hints for the footer of the current screen.
    pub fn hints(&self) -> &'static [&'static str] {
        match &self.screen {
            Screen::MainMenu => &["[↑↓/jk] Move", "[Enter] Select", "[1-4] Jump", "[q] Quit"],
            Screen::FileSelection if self.files.is_editing() => {
                &["[Enter] Apply", "[Tab] Complete", "[Esc] Cancel"]
            }
            Screen::FileSelection => &[
                "[↑↓/jk] Move",
                "[Enter] Open",
                "[c] Change dir",
                "[r] Refresh",
                "[Esc] Menu",
            ],
            Screen::PdfProcess(wizard) if wizard.is_editing() => &["[Enter] Save", "[Esc] Cancel"],
            Screen::PdfProcess(wizard) => match wizard.step {
                WizardStep::Extract => &["[Enter] Extract text", "[Esc] Menu"],
                WizardStep::Configure => &[
                    "[↑↓/jk] Move",
                    "[n] Count",
                    "[t] Type",
                    "[e] Name",
                    "[d] Description",
                    "[Enter] Next",
                    "[Esc] Menu",
                ],
                WizardStep::Generate => &["[Enter] Generate", "[b] Back", "[Esc] Menu"],
            },
            Screen::QuestionGen(_) => &["[r] Retry", "[q] Menu"],
            Screen::CustomQuestion(wizard) if wizard.is_editing() => {
                &["[Enter] Save", "[Esc] Cancel"]
            }
            Screen::CustomQuestion(wizard) => match wizard.step {
                CustomStep::TestInfo => &[
                    "[↑↓/jk] Move",
                    "[n] Name",
                    "[d] Description",
                    "[Enter] Next",
                    "[Esc] Menu",
                ],
                CustomStep::Questions => &[
                    "[↑↓/jk] Move",
                    "[t] Type",
                    "[q] Question",
                    "[o] Options",
                    "[a] Answer",
                    "[e] Explanation",
                    "[s] Save question",
                    "[f] Finish",
                    "[Esc] Menu",
                ],
                CustomStep::Review => &["[Enter] Create test", "[b] Back", "[Esc] Menu"],
            },
            Screen::TestSelection(_) => &[
                "[↑↓/jk] Move",
                "[Enter] Select",
                "[d] Delete",
                "[r] Refresh",
                "[Esc] Menu",
            ],
            Screen::TestTaking(run) => match run.mode {
                RunMode::Answering => &["[↑↓/jk] Move", "[Enter] Answer", "[Esc] Abandon"],
                RunMode::Finished => &["[Enter] Save & exit", "[r] Review", "[Esc] Discard"],
                RunMode::Review(_) => &["[←→/hl] Page", "[b] Back", "[Esc] Discard"],
            },
            Screen::TestResults(browser) => match browser.view {
                ResultsView::List => &[
                    "[↑↓/jk] Move",
                    "[Enter] Details",
                    "[d] Delete",
                    "[r] Refresh",
                    "[q] Menu",
                ],
                ResultsView::Detail => &["[↑↓/jk] Scroll", "[d] Delete", "[b] Back"],
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::testing::services;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn app() -> App {
        App::new(services(), Theme::default())
    }

    #[test]
    fn test_menu_routes_to_screens() {
        let mut app = app();
        app.press(key(KeyCode::Char('2')));
        assert!(matches!(app.screen, Screen::CustomQuestion(_)));
        app.press(key(KeyCode::Esc));
        assert!(matches!(app.screen, Screen::MainMenu));

        app.press(key(KeyCode::Char('3')));
        match &app.screen {
            Screen::TestSelection(select) => assert_eq!(select.purpose, SelectPurpose::TakeTest),
            _ => panic!("expected test selection"),
        }
        app.press(key(KeyCode::Esc));
        app.press(key(KeyCode::Char('q')));
        assert!(app.should_quit);
    }

    #[test]
    fn test_ctrl_c_quits_anywhere() {
        let mut app = app();
        app.press(key(KeyCode::Char('2')));
        app.press(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert!(app.should_quit);
    }

    #[test]
    fn test_release_events_are_ignored() {
        let mut app = app();
        let mut release = key(KeyCode::Char('2'));
        release.kind = KeyEventKind::Release;
        app.press(release);
        assert!(matches!(app.screen, Screen::MainMenu));
    }

    #[test]
    fn test_esc_cancels_editor_before_leaving_screen() {
        let mut app = app();
        app.press(key(KeyCode::Char('2')));
        app.press(key(KeyCode::Char('n')));
        assert!(app.is_editing());
        app.press(key(KeyCode::Esc));
        assert!(matches!(app.screen, Screen::CustomQuestion(_)));
        app.press(key(KeyCode::Esc));
        assert!(matches!(app.screen, Screen::MainMenu));
    }

    #[test]
    fn test_menu_cursor_survives_round_trip() {
        let mut app = app();
        app.press(key(KeyCode::Down));
        app.press(key(KeyCode::Enter));
        app.press(key(KeyCode::Esc));
        assert_eq!(app.menu.selected, 1);
    }
}
