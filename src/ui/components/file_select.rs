use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::text::Line;
use ratatui::widgets::{Paragraph, Widget};

use crate::session::file_select::FileBrowser;
use crate::ui::components::{editor_lines, list_line, muted_line, panel, visible_window};
use crate::ui::theme::Theme;

pub struct FileSelectView<'a> {
    pub browser: &'a FileBrowser,
    pub theme: &'a Theme,
}

impl Widget for FileSelectView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;
        let browser = self.browser;
        let block = panel(format!(" {} ", browser.dir.display()), colors);
        let inner = block.inner(area);
        block.render(area, buf);

        let mut lines: Vec<Line> = Vec::new();
        if let Some(input) = &browser.dir_input {
            lines.extend(editor_lines("Enter directory path:", input, colors));
            if input.completion_error {
                lines.push(muted_line("   (cannot read that directory)", colors));
            }
            lines.push(Line::from(""));
        }

        if browser.files.is_empty() {
            lines.push(muted_line(" No PDF files found in this directory.", colors));
        } else {
            lines.push(muted_line(
                format!(" {} PDF file(s), searched recursively", browser.files.len()),
                colors,
            ));
            let height = (inner.height as usize).saturating_sub(lines.len());
            let (start, end) = visible_window(browser.selected, browser.files.len(), height);
            for (i, path) in browser.files[start..end].iter().enumerate() {
                let shown = path.strip_prefix(&browser.dir).unwrap_or(path.as_path());
                lines.push(list_line(
                    shown.display().to_string(),
                    start + i == browser.selected,
                    colors,
                ));
            }
        }
        Paragraph::new(lines).render(inner, buf);
    }
}
