use crossterm::event::{KeyCode, KeyEvent};

use crate::session::{Message, is_confirm, is_down, is_up, step_cursor};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MenuChoice {
    GenerateFromPdf,
    CreateCustom,
    TakeTest,
    ViewTests,
    Exit,
}

pub struct MenuItem {
    pub key: char,
    pub label: &'static str,
    pub description: &'static str,
    pub choice: MenuChoice,
}

pub const MENU_ITEMS: [MenuItem; 5] = [
    MenuItem {
        key: '1',
        label: "Generate questions from PDF",
        description: "Extract a document's text and let the model write a test",
        choice: MenuChoice::GenerateFromPdf,
    },
    MenuItem {
        key: '2',
        label: "Create custom questions",
        description: "Write a test by hand, one question at a time",
        choice: MenuChoice::CreateCustom,
    },
    MenuItem {
        key: '3',
        label: "Take practice test",
        description: "Answer a saved test against the clock",
        choice: MenuChoice::TakeTest,
    },
    MenuItem {
        key: '4',
        label: "View saved tests",
        description: "Browse tests and past results",
        choice: MenuChoice::ViewTests,
    },
    MenuItem {
        key: 'q',
        label: "Exit",
        description: "Leave pdfquiz",
        choice: MenuChoice::Exit,
    },
];

#[derive(Debug, Default)]
pub struct MainMenu {
    pub selected: usize,
    /// Shown once after returning from another screen.
    pub flash: Option<Message>,
}

impl MainMenu {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Option<MenuChoice> {
        self.flash = None;

        if is_up(&key) || is_down(&key) {
            step_cursor(&mut self.selected, MENU_ITEMS.len(), is_down(&key));
            return None;
        }
        if is_confirm(&key) {
            return Some(MENU_ITEMS[self.selected].choice);
        }
        match key.code {
            KeyCode::Char(ch) => MENU_ITEMS
                .iter()
                .position(|item| item.key == ch)
                .map(|i| {
                    self.selected = i;
                    MENU_ITEMS[i].choice
                }),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_cursor_clamps_instead_of_wrapping() {
        let mut menu = MainMenu::new();
        menu.handle_key(key(KeyCode::Up));
        assert_eq!(menu.selected, 0);
        for _ in 0..10 {
            menu.handle_key(key(KeyCode::Char('j')));
        }
        assert_eq!(menu.selected, MENU_ITEMS.len() - 1);
        menu.handle_key(key(KeyCode::Char('k')));
        assert_eq!(menu.selected, 3);
    }

    #[test]
    fn test_confirm_dispatches_selected_item() {
        let mut menu = MainMenu::new();
        assert_eq!(menu.handle_key(key(KeyCode::Enter)), Some(MenuChoice::GenerateFromPdf));
        menu.handle_key(key(KeyCode::Down));
        menu.handle_key(key(KeyCode::Down));
        assert_eq!(menu.handle_key(key(KeyCode::Char(' '))), Some(MenuChoice::TakeTest));
    }

    #[test]
    fn test_shortcut_keys_select_and_dispatch() {
        let mut menu = MainMenu::new();
        assert_eq!(menu.handle_key(key(KeyCode::Char('4'))), Some(MenuChoice::ViewTests));
        assert_eq!(menu.selected, 3);
        assert_eq!(menu.handle_key(key(KeyCode::Char('q'))), Some(MenuChoice::Exit));
        assert_eq!(menu.handle_key(key(KeyCode::Char('x'))), None);
    }

    #[test]
    fn test_any_key_clears_flash() {
        let mut menu = MainMenu::new();
        menu.flash = Some(Message::info("saved"));
        menu.handle_key(key(KeyCode::Down));
        assert!(menu.flash.is_none());
    }
}
