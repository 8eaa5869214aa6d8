use crossterm::event::{KeyCode, KeyEvent};

use crate::engine::scoring::grade;
use crate::session::{Message, Nav, Services, is_confirm, is_down, is_up, step_cursor};
use crate::store::db::Store;
use crate::store::schema::{QuestionAnswerDetail, TestResultWithName};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResultsView {
    List,
    Detail,
}

/// Browser over every stored result, newest first, with a per-question
/// drill-down.
pub struct ResultsBrowser {
    pub results: Vec<TestResultWithName>,
    pub selected: usize,
    pub view: ResultsView,
    pub details: Vec<QuestionAnswerDetail>,
    /// First detail row shown in the drill-down.
    pub scroll: usize,
    pub message: Option<Message>,
}

impl ResultsBrowser {
    pub fn open(store: &Store) -> Self {
        let mut browser = Self {
            results: Vec::new(),
            selected: 0,
            view: ResultsView::List,
            details: Vec::new(),
            scroll: 0,
            message: None,
        };
        browser.reload(store);
        browser
    }

    /// Opens the list with the cursor on `result_id` when it is present.
    pub fn open_focused(store: &Store, result_id: Option<i64>) -> Self {
        let mut browser = Self::open(store);
        if let Some(pos) = result_id.and_then(|id| browser.results.iter().position(|r| r.id == id))
        {
            browser.selected = pos;
        }
        browser
    }

    pub fn reload(&mut self, store: &Store) {
        match store.get_all_test_results() {
            Ok(results) => self.results = results,
            Err(e) => {
                tracing::warn!(error = %e, "failed to load results");
                self.results.clear();
                self.message = Some(Message::error(format!("Failed to load results: {e}")));
            }
        }
        self.selected = self.selected.min(self.results.len().saturating_sub(1));
    }

    pub fn selected_result(&self) -> Option<&TestResultWithName> {
        self.results.get(self.selected)
    }

    pub fn row_label(result: &TestResultWithName) -> String {
        format!(
            "{} - {:.1}% ({}) - {}/{} correct - {}",
            result.test_name,
            result.score,
            grade(result.score),
            result.correct_answers,
            result.total_questions,
            result.completed_at.format("%Y-%m-%d %H:%M")
        )
    }

    pub fn handle_key(&mut self, key: KeyEvent, svc: &mut Services) -> Nav {
        self.message = None;
        match self.view {
            ResultsView::List => self.handle_list(key, svc),
            ResultsView::Detail => {
                self.handle_detail(key, svc);
                Nav::Stay
            }
        }
    }

    fn handle_list(&mut self, key: KeyEvent, svc: &mut Services) -> Nav {
        if is_up(&key) || is_down(&key) {
            step_cursor(&mut self.selected, self.results.len(), is_down(&key));
            return Nav::Stay;
        }
        if is_confirm(&key) {
            self.load_details(&svc.store);
            return Nav::Stay;
        }
        match key.code {
            KeyCode::Char('d') => self.delete_selected(svc),
            KeyCode::Char('r') => {
                self.reload(&svc.store);
                if self.message.is_none() {
                    self.message = Some(Message::info("Results refreshed"));
                }
            }
            KeyCode::Char('q') => return Nav::Menu(None),
            _ => {}
        }
        Nav::Stay
    }

    fn handle_detail(&mut self, key: KeyEvent, svc: &mut Services) {
        if is_up(&key) || is_down(&key) {
            step_cursor(&mut self.scroll, self.details.len(), is_down(&key));
            return;
        }
        match key.code {
            KeyCode::Char('b') => self.back_to_list(),
            KeyCode::Char('d') => self.delete_selected(svc),
            _ => {}
        }
    }

    fn load_details(&mut self, store: &Store) {
        let Some(result) = self.selected_result() else {
            return;
        };
        let id = result.id;
        match store.get_test_result_answers(id) {
            Ok(details) => {
                tracing::debug!(result_id = id, count = details.len(), "loaded answers");
                self.details = details;
                self.scroll = 0;
                self.view = ResultsView::Detail;
            }
            Err(e) => {
                self.message = Some(Message::error(format!("Failed to load answers: {e}")));
            }
        }
    }

    fn back_to_list(&mut self) {
        self.view = ResultsView::List;
        self.details.clear();
        self.scroll = 0;
    }

    fn delete_selected(&mut self, svc: &mut Services) {
        let Some(result) = self.selected_result() else {
            return;
        };
        let (id, name) = (result.id, result.test_name.clone());
        match svc.store.delete_test_result(id) {
            Ok(()) => {
                tracing::info!(result_id = id, "deleted result");
                self.results.remove(self.selected);
                self.selected = self.selected.min(self.results.len().saturating_sub(1));
                self.back_to_list();
                self.message = Some(Message::info(format!("Deleted result for '{name}'")));
            }
            Err(e) => {
                self.message = Some(Message::error(format!("Failed to delete result: {e}")));
            }
        }
    }
}
