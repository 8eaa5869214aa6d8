pub mod custom_wizard;
pub mod file_select;
pub mod menu;
pub mod pdf_wizard;
pub mod question_gen;
pub mod results;
pub mod test_run;
pub mod test_select;

#[cfg(test)]
pub(crate) mod testing;

use std::path::PathBuf;

use crossterm::event::{KeyCode, KeyEvent};

use crate::app::Screen;
use crate::config::Config;
use crate::generator::QuestionGenerator;
use crate::pdf::TextExtractor;
use crate::store::db::Store;

/// Collaborators every screen handler may call into.
pub struct Services {
    pub store: Store,
    pub extractor: Box<dyn TextExtractor>,
    pub generator: Box<dyn QuestionGenerator>,
    pub config: Config,
    /// Where config changes are written back; `None` keeps them in memory.
    pub config_path: Option<PathBuf>,
}

impl Services {
    pub fn persist_config(&self) {
        let Some(path) = &self.config_path else {
            return;
        };
        match self.config.save_to(path) {
            Ok(()) => tracing::debug!(path = %path.display(), "config saved"),
            Err(e) => tracing::warn!(error = %e, "failed to save config"),
        }
    }
}

/// Transient line shown under a screen's header until the next key press.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Message {
    Info(String),
    Error(String),
}

impl Message {
    pub fn info(text: impl Into<String>) -> Self {
        Message::Info(text.into())
    }

    pub fn error(text: impl Into<String>) -> Self {
        Message::Error(text.into())
    }

    pub fn text(&self) -> &str {
        match self {
            Message::Info(t) | Message::Error(t) => t,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Message::Error(_))
    }
}

/// What a screen handler asks the app to do next.
pub enum Nav {
    Stay,
    Menu(Option<Message>),
    Quit,
    Open(Screen),
    /// Move the PDF wizard into the generation screen and run it.
    StartGeneration,
    /// Hand the wizard held by the generation screen back to the user.
    RetryGeneration,
}

pub fn is_up(key: &KeyEvent) -> bool {
    matches!(key.code, KeyCode::Up | KeyCode::Char('k'))
}

pub fn is_down(key: &KeyEvent) -> bool {
    matches!(key.code, KeyCode::Down | KeyCode::Char('j'))
}

pub fn is_confirm(key: &KeyEvent) -> bool {
    matches!(key.code, KeyCode::Enter | KeyCode::Char(' '))
}

/// Moves a list cursor one step, clamped to `[0, len-1]`.
pub fn step_cursor(cursor: &mut usize, len: usize, down: bool) {
    if down {
        if *cursor + 1 < len {
            *cursor += 1;
        }
    } else {
        *cursor = cursor.saturating_sub(1);
    }
}

/// Trimmed input, or an error when it is shorter than `min_chars`.
pub fn require_len(input: &str, min_chars: usize) -> Result<String, String> {
    let trimmed = input.trim();
    if trimmed.chars().count() < min_chars {
        return Err(format!("input must be at least {min_chars} characters long"));
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_cursor_clamps_both_ends() {
        let mut cursor = 0;
        step_cursor(&mut cursor, 3, false);
        assert_eq!(cursor, 0);
        step_cursor(&mut cursor, 3, true);
        step_cursor(&mut cursor, 3, true);
        step_cursor(&mut cursor, 3, true);
        assert_eq!(cursor, 2);

        let mut empty = 0;
        step_cursor(&mut empty, 0, true);
        assert_eq!(empty, 0);
    }

    #[test]
    fn test_require_len_trims_and_counts_chars() {
        assert_eq!(require_len("  hello  ", 5).unwrap(), "hello");
        assert_eq!(
            require_len(" hi ", 5).unwrap_err(),
            "input must be at least 5 characters long"
        );
        assert!(require_len("   ", 1).is_err());
        assert_eq!(require_len("ééééé", 5).unwrap(), "ééééé");
    }
}
