use crossterm::event::{KeyCode, KeyEvent};

use crate::app::Screen;
use crate::session::results::ResultsBrowser;
use crate::session::test_run::TestRun;
use crate::session::{Message, Nav, Services, is_confirm, is_down, is_up, step_cursor};
use crate::store::db::Store;
use crate::store::schema::Test;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SelectPurpose {
    TakeTest,
    ViewTests,
}

pub struct TestListing {
    pub test: Test,
    pub questions: usize,
}

impl TestListing {
    pub fn label(&self) -> String {
        format!(
            "{} ({} questions) - Created: {}",
            self.test.name,
            self.questions,
            self.test.created_at.format("%Y-%m-%d")
        )
    }
}

pub struct TestSelect {
    pub purpose: SelectPurpose,
    pub tests: Vec<TestListing>,
    pub selected: usize,
    pub message: Option<Message>,
}

impl TestSelect {
    pub fn open(purpose: SelectPurpose, store: &Store) -> Self {
        let mut screen = Self {
            purpose,
            tests: Vec::new(),
            selected: 0,
            message: None,
        };
        screen.reload(store);
        screen
    }

    pub fn title(&self) -> &'static str {
        match self.purpose {
            SelectPurpose::TakeTest => "Select Test",
            SelectPurpose::ViewTests => "View Tests",
        }
    }

    pub fn reload(&mut self, store: &Store) {
        match store.get_all_tests() {
            Ok(tests) => {
                self.tests = tests
                    .into_iter()
                    .map(|test| {
                        let questions = store.count_questions(test.id).unwrap_or(0);
                        TestListing { test, questions }
                    })
                    .collect();
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to load tests");
                self.tests.clear();
                self.message = Some(Message::error(format!("Failed to load tests: {e}")));
            }
        }
        self.selected = self.selected.min(self.tests.len().saturating_sub(1));
    }

    pub fn handle_key(&mut self, key: KeyEvent, svc: &mut Services) -> Nav {
        self.message = None;

        if is_up(&key) || is_down(&key) {
            step_cursor(&mut self.selected, self.tests.len(), is_down(&key));
            return Nav::Stay;
        }
        if is_confirm(&key) {
            return self.choose(svc);
        }
        match key.code {
            KeyCode::Char('d') => self.delete_selected(svc),
            KeyCode::Char('r') => self.reload(&svc.store),
            KeyCode::Char('q') => return Nav::Menu(None),
            _ => {}
        }
        Nav::Stay
    }

    fn choose(&mut self, svc: &Services) -> Nav {
        let Some(listing) = self.tests.get(self.selected) else {
            return Nav::Stay;
        };
        let test = listing.test.clone();
        match self.purpose {
            SelectPurpose::TakeTest => match svc.store.get_questions_by_test_id(test.id) {
                Ok(questions) if questions.is_empty() => {
                    self.message = Some(Message::error("This test has no questions"));
                    Nav::Stay
                }
                Ok(questions) => {
                    tracing::info!(test_id = test.id, count = questions.len(), "starting test");
                    Nav::Open(Screen::TestTaking(TestRun::new(test, questions)))
                }
                Err(e) => {
                    self.message = Some(Message::error(format!("Failed to load questions: {e}")));
                    Nav::Stay
                }
            },
            SelectPurpose::ViewTests => match svc.store.get_test_results(test.id) {
                Ok(results) => {
                    let newest = results.first().map(|r| r.id);
                    Nav::Open(Screen::TestResults(ResultsBrowser::open_focused(
                        &svc.store, newest,
                    )))
                }
                Err(e) => {
                    self.message = Some(Message::error(format!("Failed to load results: {e}")));
                    Nav::Stay
                }
            },
        }
    }

    fn delete_selected(&mut self, svc: &mut Services) {
        let Some(listing) = self.tests.get(self.selected) else {
            return;
        };
        let (id, name) = (listing.test.id, listing.test.name.clone());
        match svc.store.delete_test(id) {
            Ok(()) => {
                tracing::info!(test_id = id, "deleted test");
                self.tests.remove(self.selected);
                self.selected = self.selected.min(self.tests.len().saturating_sub(1));
                self.message = Some(Message::info(format!("Deleted test '{name}'")));
            }
            Err(e) => {
                self.message = Some(Message::error(format!("Failed to delete test: {e}")));
            }
        }
    }
}
