use std::io;
use std::path::MAIN_SEPARATOR;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Directory entries looked at per completion request.
const SCAN_LIMIT: usize = 1000;
const MAX_CANDIDATES: usize = 100;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputResult {
    Continue,
    Submit,
    Cancel,
}

/// Tab-completion state; dropped by any key other than Tab/BackTab.
struct Completion {
    candidates: Vec<String>,
    index: usize,
}

/// Single-line editor used for every text prompt.
pub struct LineInput {
    text: String,
    /// Char index; `text.chars().count()` means after the last char.
    cursor: usize,
    dirs_only: bool,
    completion: Option<Completion>,
    /// Set when the last completion request could not read the directory.
    pub completion_error: bool,
}

impl LineInput {
    pub fn new(text: &str) -> Self {
        Self {
            text: text.to_string(),
            cursor: text.chars().count(),
            dirs_only: false,
            completion: None,
            completion_error: false,
        }
    }

    /// Restricts Tab completion to directories.
    pub fn dirs_only(mut self) -> Self {
        self.dirs_only = true;
        self
    }

    pub fn value(&self) -> &str {
        &self.text
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Text before the cursor, the char under it, and the rest.
    pub fn render_parts(&self) -> (&str, Option<char>, &str) {
        let at = self.byte_at(self.cursor);
        let rest = &self.text[at..];
        match rest.chars().next() {
            Some(ch) => (&self.text[..at], Some(ch), &rest[ch.len_utf8()..]),
            None => (&self.text, None, ""),
        }
    }

    pub fn handle(&mut self, key: KeyEvent) -> InputResult {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Tab => {
                self.complete(true);
                return InputResult::Continue;
            }
            KeyCode::BackTab => {
                self.complete(false);
                return InputResult::Continue;
            }
            _ => self.clear_completion(),
        }

        match key.code {
            KeyCode::Esc => return InputResult::Cancel,
            KeyCode::Enter => return InputResult::Submit,
            KeyCode::Left => self.cursor = self.cursor.saturating_sub(1),
            KeyCode::Right => self.cursor = (self.cursor + 1).min(self.len()),
            KeyCode::Home => self.cursor = 0,
            KeyCode::End => self.cursor = self.len(),
            KeyCode::Backspace if self.cursor > 0 => {
                self.cursor -= 1;
                self.remove_at(self.cursor);
            }
            KeyCode::Delete => self.remove_at(self.cursor),
            KeyCode::Char('a') if ctrl => self.cursor = 0,
            KeyCode::Char('e') if ctrl => self.cursor = self.len(),
            KeyCode::Char('u') if ctrl => {
                self.text.clear();
                self.cursor = 0;
            }
            KeyCode::Char('w') if ctrl => self.delete_word_back(),
            KeyCode::Char(ch) if !ctrl => {
                let at = self.byte_at(self.cursor);
                self.text.insert(at, ch);
                self.cursor += 1;
            }
            _ => {}
        }
        InputResult::Continue
    }

    fn len(&self) -> usize {
        self.text.chars().count()
    }

    fn byte_at(&self, char_idx: usize) -> usize {
        self.text
            .char_indices()
            .nth(char_idx)
            .map_or(self.text.len(), |(b, _)| b)
    }

    fn remove_at(&mut self, char_idx: usize) {
        let at = self.byte_at(char_idx);
        if let Some(ch) = self.text[at..].chars().next() {
            self.text.replace_range(at..at + ch.len_utf8(), "");
        }
    }

    /// Ctrl-W: drops trailing whitespace, then the word before it.
    fn delete_word_back(&mut self) {
        let chars: Vec<char> = self.text.chars().take(self.cursor).collect();
        let mut start = chars.len();
        while start > 0 && chars[start - 1].is_whitespace() {
            start -= 1;
        }
        while start > 0 && !chars[start - 1].is_whitespace() {
            start -= 1;
        }
        let (from, to) = (self.byte_at(start), self.byte_at(self.cursor));
        self.text.replace_range(from..to, "");
        self.cursor = start;
    }

    fn clear_completion(&mut self) {
        self.completion = None;
        self.completion_error = false;
    }

    fn complete(&mut self, forward: bool) {
        if self.cursor < self.len() {
            return;
        }
        if let Some(completion) = self.completion.as_mut() {
            let count = completion.candidates.len();
            completion.index = if forward {
                (completion.index + 1) % count
            } else {
                (completion.index + count - 1) % count
            };
            let next = completion.candidates[completion.index].clone();
            self.set_text(next);
            return;
        }

        match path_candidates(&self.text, self.dirs_only) {
            Ok(candidates) => {
                self.completion_error = false;
                if let Some(first) = candidates.first().cloned() {
                    self.completion = Some(Completion {
                        candidates,
                        index: 0,
                    });
                    self.set_text(first);
                }
            }
            Err(e) => {
                tracing::debug!(error = %e, "path completion failed");
                self.completion_error = true;
            }
        }
    }

    fn set_text(&mut self, text: String) {
        self.text = text;
        self.cursor = self.len();
    }
}

/// Completions for a partially typed path, directories first.
fn path_candidates(seed: &str, dirs_only: bool) -> io::Result<Vec<String>> {
    let split = seed.rfind(['/', '\\']).map_or(0, |i| i + 1);
    let (dir, partial) = seed.split_at(split);

    let read_from = match dir.strip_prefix('~') {
        Some(rest) => match dirs::home_dir() {
            Some(home) => format!("{}{rest}", home.display()),
            None => dir.to_string(),
        },
        None if dir.is_empty() => ".".to_string(),
        None => dir.to_string(),
    };

    let entries = std::fs::read_dir(read_from)?.map(|entry| {
        entry.map(|e| {
            let is_dir = e.file_type().is_ok_and(|t| t.is_dir());
            (e.file_name().to_string_lossy().into_owned(), is_dir)
        })
    });
    rank_candidates(entries, dir, partial, dirs_only)
}

fn rank_candidates(
    entries: impl Iterator<Item = io::Result<(String, bool)>>,
    dir: &str,
    partial: &str,
    dirs_only: bool,
) -> io::Result<Vec<String>> {
    let show_hidden = partial.starts_with('.');
    let mut found: Vec<(bool, String)> = Vec::new();
    for entry in entries.take(SCAN_LIMIT) {
        let (name, is_dir) = entry?;
        if (!show_hidden && name.starts_with('.'))
            || !name.starts_with(partial)
            || (dirs_only && !is_dir)
        {
            continue;
        }
        let text = if is_dir {
            format!("{dir}{name}{MAIN_SEPARATOR}")
        } else {
            format!("{dir}{name}")
        };
        found.push((is_dir, text));
    }
    found.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| a.1.cmp(&b.1)));
    found.truncate(MAX_CANDIDATES);
    Ok(found.into_iter().map(|(_, text)| text).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn ctrl(ch: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(ch), KeyModifiers::CONTROL)
    }

    #[test]
    fn test_editing_moves_cursor_by_chars() {
        let mut input = LineInput::new("né");
        input.handle(key(KeyCode::Home));
        input.handle(key(KeyCode::Char('a')));
        assert_eq!(input.value(), "ané");
        assert_eq!(input.cursor(), 1);

        input.handle(key(KeyCode::End));
        input.handle(key(KeyCode::Backspace));
        assert_eq!(input.value(), "an");
        input.handle(key(KeyCode::Right));
        assert_eq!(input.cursor(), 2);

        input.handle(key(KeyCode::Home));
        input.handle(key(KeyCode::Delete));
        input.handle(key(KeyCode::Delete));
        input.handle(key(KeyCode::Delete));
        input.handle(key(KeyCode::Backspace));
        assert_eq!(input.value(), "");
    }

    #[test]
    fn test_control_keys() {
        let mut input = LineInput::new("foo bar  ");
        input.handle(ctrl('w'));
        assert_eq!(input.value(), "foo ");
        input.handle(ctrl('a'));
        assert_eq!(input.cursor(), 0);
        input.handle(ctrl('e'));
        assert_eq!(input.cursor(), 4);
        input.handle(ctrl('u'));
        assert_eq!(input.value(), "");
        assert_eq!(input.cursor(), 0);
    }

    #[test]
    fn test_render_parts() {
        let mut input = LineInput::new("abc");
        assert_eq!(input.render_parts(), ("abc", None, ""));
        input.handle(key(KeyCode::Left));
        input.handle(key(KeyCode::Left));
        assert_eq!(input.render_parts(), ("a", Some('b'), "c"));
    }

    #[test]
    fn test_submit_and_cancel() {
        let mut input = LineInput::new("x");
        assert_eq!(input.handle(key(KeyCode::Enter)), InputResult::Submit);
        assert_eq!(input.handle(key(KeyCode::Esc)), InputResult::Cancel);
        assert_eq!(input.handle(key(KeyCode::Char('y'))), InputResult::Continue);
    }

    #[test]
    fn test_tab_cycles_directories_first() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("alpha.pdf"), "").unwrap();
        fs::write(dir.path().join(".hidden"), "").unwrap();
        fs::create_dir(dir.path().join("zeta")).unwrap();
        let mut input = LineInput::new(&format!("{}/", dir.path().display()));

        input.handle(key(KeyCode::Tab));
        assert!(input.value().ends_with(&format!("zeta{MAIN_SEPARATOR}")));
        input.handle(key(KeyCode::Tab));
        assert!(input.value().ends_with("alpha.pdf"));
        input.handle(key(KeyCode::Tab));
        assert!(input.value().ends_with(&format!("zeta{MAIN_SEPARATOR}")));
        input.handle(key(KeyCode::BackTab));
        assert!(input.value().ends_with("alpha.pdf"));
    }

    #[test]
    fn test_dirs_only_skips_files() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("paper.pdf"), "").unwrap();
        fs::create_dir(dir.path().join("papers")).unwrap();
        let mut input = LineInput::new(&format!("{}/pap", dir.path().display())).dirs_only();

        input.handle(key(KeyCode::Tab));
        assert!(input.value().ends_with(&format!("papers{MAIN_SEPARATOR}")));
        input.handle(key(KeyCode::Tab));
        assert!(input.value().ends_with(&format!("papers{MAIN_SEPARATOR}")));
    }

    #[test]
    fn test_unreadable_dir_sets_error_until_next_key() {
        let mut input = LineInput::new("/nonexistent_pdfquiz_dir/");
        input.handle(key(KeyCode::Tab));
        assert!(input.completion_error);
        assert_eq!(input.value(), "/nonexistent_pdfquiz_dir/");
        input.handle(key(KeyCode::Left));
        assert!(!input.completion_error);
    }

    #[test]
    fn test_tab_mid_line_does_nothing() {
        let mut input = LineInput::new("/tmp");
        input.handle(key(KeyCode::Home));
        input.handle(key(KeyCode::Tab));
        assert_eq!(input.value(), "/tmp");
        assert_eq!(input.cursor(), 0);
    }

    #[test]
    fn test_rank_candidates_caps_and_propagates_errors() {
        let many = (0..300).map(|i| Ok((format!("f{i:03}"), false)));
        assert_eq!(rank_candidates(many, "", "", false).unwrap().len(), MAX_CANDIDATES);

        let broken = vec![
            Ok(("a".to_string(), false)),
            Err(io::Error::new(io::ErrorKind::PermissionDenied, "denied")),
        ];
        assert!(rank_candidates(broken.into_iter(), "", "", false).is_err());
    }
}
