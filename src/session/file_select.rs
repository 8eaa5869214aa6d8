use std::path::{Path, PathBuf};

use crossterm::event::{KeyCode, KeyEvent};
use walkdir::{DirEntry, WalkDir};

use crate::app::Screen;
use crate::session::pdf_wizard::PdfWizard;
use crate::session::{Message, Nav, Services, is_confirm, is_down, is_up, step_cursor};
use crate::ui::line_input::{InputResult, LineInput};

/// PDF picker. Lives on the app rather than in a screen variant so the
/// directory and listing survive leaving and re-entering the screen.
pub struct FileBrowser {
    pub dir: PathBuf,
    pub files: Vec<PathBuf>,
    pub selected: usize,
    pub dir_input: Option<LineInput>,
    pub message: Option<Message>,
    loaded: bool,
}

impl FileBrowser {
    pub fn new(dir: PathBuf) -> Self {
        Self {
            dir,
            files: Vec::new(),
            selected: 0,
            dir_input: None,
            message: None,
            loaded: false,
        }
    }

    /// Scans the directory the first time the screen is shown.
    pub fn ensure_loaded(&mut self) {
        if !self.loaded {
            self.refresh();
        }
    }

    pub fn refresh(&mut self) {
        self.loaded = true;
        self.selected = 0;
        match find_pdfs(&self.dir) {
            Ok(files) => {
                tracing::debug!(dir = %self.dir.display(), count = files.len(), "listed PDF files");
                self.files = files;
            }
            Err(e) => {
                tracing::warn!(dir = %self.dir.display(), error = %e, "failed to list PDF files");
                self.files.clear();
                self.message = Some(Message::error(format!("Error reading directory: {e}")));
            }
        }
    }

    pub fn is_editing(&self) -> bool {
        self.dir_input.is_some()
    }

    pub fn handle_key(&mut self, key: KeyEvent, svc: &mut Services) -> Nav {
        self.message = None;

        if let Some(input) = self.dir_input.as_mut() {
            match input.handle(key) {
                InputResult::Continue => {}
                InputResult::Cancel => self.dir_input = None,
                InputResult::Submit => {
                    let raw = input.value().trim().to_string();
                    self.dir_input = None;
                    self.change_dir(&raw, svc);
                }
            }
            return Nav::Stay;
        }

        if is_up(&key) || is_down(&key) {
            step_cursor(&mut self.selected, self.files.len(), is_down(&key));
            return Nav::Stay;
        }
        if is_confirm(&key) {
            let Some(path) = self.files.get(self.selected).cloned() else {
                return Nav::Stay;
            };
            tracing::info!(path = %path.display(), "selected PDF");
            return Nav::Open(Screen::PdfProcess(PdfWizard::open(path, svc)));
        }
        match key.code {
            KeyCode::Char('r') => self.refresh(),
            KeyCode::Char('c') => {
                self.dir_input = Some(LineInput::new(&self.dir.to_string_lossy()).dirs_only());
            }
            _ => {}
        }
        Nav::Stay
    }

    fn change_dir(&mut self, raw: &str, svc: &mut Services) {
        let dir = expand_home(raw);
        if !dir.is_dir() {
            self.message = Some(Message::error("Directory does not exist"));
            return;
        }
        self.dir = dir;
        self.refresh();
        svc.config.pdf_dir = self.dir.clone();
        svc.persist_config();
    }
}

/// Every `.pdf` file under `dir`, recursively, sorted by path. Hidden
/// directories are not descended into and unreadable entries are skipped.
pub fn find_pdfs(dir: &Path) -> Result<Vec<PathBuf>, walkdir::Error> {
    let mut walker = WalkDir::new(dir).follow_links(false).into_iter();
    // The root itself must be readable.
    if let Some(Err(e)) = walker.next() {
        return Err(e);
    }

    let mut files: Vec<PathBuf> = walker
        .filter_entry(|e| !is_hidden(e))
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                tracing::debug!(error = %e, "skipping unreadable entry");
                None
            }
        })
        .filter(|e| e.file_type().is_file() && has_pdf_extension(e.path()))
        .map(DirEntry::into_path)
        .collect();
    files.sort();
    Ok(files)
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry.depth() > 0 && entry.file_name().to_string_lossy().starts_with('.')
}

fn has_pdf_extension(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"))
}

pub fn expand_home(raw: &str) -> PathBuf {
    if let Some(rest) = raw.strip_prefix('~') {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest.trim_start_matches(['/', '\\']));
        }
    }
    PathBuf::from(raw)
}
