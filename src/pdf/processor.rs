use std::path::Path;

use thiserror::Error;

/// Lines shorter than this (after trimming) are treated as layout debris.
const MIN_LINE_CHARS: usize = 3;

/// How far back from the cut point `text_summary` looks for a word boundary.
const SUMMARY_LOOKBACK: usize = 50;

#[derive(Debug, Error)]
pub enum PdfError {
    #[error("failed to open PDF file: {0}")]
    Open(String),
    #[error("PDF file has no pages")]
    NoPages,
    #[error("failed to read PDF text: {0}")]
    Extract(String),
    #[error("no text could be extracted from the PDF")]
    NoText,
}

pub trait TextExtractor {
    /// Cleaned plain text of the whole document.
    fn extract_text(&self, path: &Path) -> Result<String, PdfError>;

    fn validate_pdf(&self, path: &Path) -> Result<(), PdfError>;

    fn pdf_info(&self, _path: &Path) -> Result<PdfInfo, PdfError> {
        Ok(PdfInfo::default())
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PdfInfo {
    pub pages: usize,
    pub title: Option<String>,
}

#[derive(Clone, Copy, Debug, Default)]
pub struct PdfProcessor;

impl PdfProcessor {
    pub fn new() -> Self {
        Self
    }
}

impl TextExtractor for PdfProcessor {
    fn pdf_info(&self, path: &Path) -> Result<PdfInfo, PdfError> {
        let doc = load(path)?;
        let title = doc
            .trailer
            .get(b"Info")
            .and_then(|info| info.as_reference())
            .and_then(|id| doc.get_dictionary(id))
            .and_then(|dict| dict.get(b"Title"))
            .and_then(|title| title.as_str())
            .ok()
            .map(|raw| String::from_utf8_lossy(raw).trim().to_string())
            .filter(|t| !t.is_empty());
        Ok(PdfInfo {
            pages: doc.get_pages().len(),
            title,
        })
    }

    fn extract_text(&self, path: &Path) -> Result<String, PdfError> {
        self.validate_pdf(path)?;
        let pages = pdf_extract::extract_text_by_pages(path)
            .map_err(|e| PdfError::Extract(e.to_string()))?;
        tracing::debug!(path = %path.display(), pages = pages.len(), "extracted raw page text");
        join_pages(pages)
    }

    fn validate_pdf(&self, path: &Path) -> Result<(), PdfError> {
        if load(path)?.get_pages().is_empty() {
            return Err(PdfError::NoPages);
        }
        Ok(())
    }
}

fn load(path: &Path) -> Result<lopdf::Document, PdfError> {
    lopdf::Document::load(path).map_err(|e| PdfError::Open(e.to_string()))
}

/// Trims every line, drops blank and very short lines, joins the rest with spaces.
pub fn clean_page(text: &str) -> String {
    text.lines()
        .map(str::trim)
        .filter(|line| line.chars().count() >= MIN_LINE_CHARS)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Cleans each page and joins the non-empty ones with a blank line.
pub fn join_pages<I, S>(pages: I) -> Result<String, PdfError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let cleaned: Vec<String> = pages
        .into_iter()
        .map(|page| clean_page(page.as_ref()))
        .filter(|page| !page.is_empty())
        .collect();
    let text = cleaned.join("\n\n");
    let text = text.trim();
    if text.is_empty() {
        return Err(PdfError::NoText);
    }
    Ok(text.to_string())
}

/// Shortens `text` to about `max_len` characters for previews, preferring to
/// cut at a space, period or newline found within the last 50 characters.
pub fn text_summary(text: &str, max_len: usize) -> String {
    let chars: Vec<char> = text.chars().collect();
    if chars.len() <= max_len {
        return text.to_string();
    }

    let floor = max_len.saturating_sub(SUMMARY_LOOKBACK);
    let cut = (floor + 1..=max_len)
        .rev()
        .find(|&i| matches!(chars[i], ' ' | '.' | '\n'))
        .unwrap_or(max_len);

    let mut summary: String = chars[..cut].iter().collect();
    summary.push_str("...");
    summary
}
