use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::text::Line;
use ratatui::widgets::{Paragraph, Widget};

use crate::session::test_select::TestSelect;
use crate::ui::components::{list_line, muted_line, panel, visible_window};
use crate::ui::theme::Theme;

pub struct TestSelectView<'a> {
    pub select: &'a TestSelect,
    pub theme: &'a Theme,
}

impl Widget for TestSelectView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;
        let s = self.select;
        let block = panel(format!(" {} ", s.title()), colors);
        let inner = block.inner(area);
        block.render(area, buf);

        if s.tests.is_empty() {
            Paragraph::new(muted_line(
                " No tests yet. Generate one from a PDF or create a custom test.",
                colors,
            ))
            .render(inner, buf);
            return;
        }

        let (start, end) = visible_window(s.selected, s.tests.len(), inner.height as usize);
        let lines: Vec<Line> = s.tests[start..end]
            .iter()
            .enumerate()
            .map(|(i, listing)| list_line(listing.label(), start + i == s.selected, colors))
            .collect();
        Paragraph::new(lines).render(inner, buf);
    }
}
