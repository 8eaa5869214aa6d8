use std::time::Duration;

use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Paragraph, Widget, Wrap};

use crate::engine::scoring::{format_duration, grade};
use crate::session::results::{ResultsBrowser, ResultsView};
use crate::ui::components::{list_line, muted_line, panel, visible_window};
use crate::ui::theme::Theme;

pub struct ResultsBrowserView<'a> {
    pub browser: &'a ResultsBrowser,
    pub theme: &'a Theme,
}

impl ResultsBrowserView<'_> {
    fn render_list(&self, area: Rect, buf: &mut Buffer) {
        let (b, colors) = (self.browser, &self.theme.colors);
        let block = panel(" Test Results ", colors);
        let inner = block.inner(area);
        block.render(area, buf);

        if b.results.is_empty() {
            Paragraph::new(muted_line(" No test results found.", colors)).render(inner, buf);
            return;
        }
        let (start, end) = visible_window(b.selected, b.results.len(), inner.height as usize);
        let lines: Vec<Line> = b.results[start..end]
            .iter()
            .enumerate()
            .map(|(i, r)| list_line(ResultsBrowser::row_label(r), start + i == b.selected, colors))
            .collect();
        Paragraph::new(lines).render(inner, buf);
    }

    fn render_detail(&self, area: Rect, buf: &mut Buffer) {
        let (b, colors) = (self.browser, &self.theme.colors);
        let Some(result) = b.selected_result() else {
            return;
        };
        let block = panel(format!(" {} ", result.test_name), colors);
        let inner = block.inner(area);
        block.render(area, buf);

        let mut lines = vec![
            Line::from(format!(
                " Score: {:.1}% ({}) - {}/{} correct - Time: {}",
                result.score,
                grade(result.score),
                result.correct_answers,
                result.total_questions,
                format_duration(Duration::from_secs(result.time_taken))
            )),
            muted_line(
                format!(" Completed {}", result.completed_at.format("%Y-%m-%d %H:%M")),
                colors,
            ),
            Line::from(""),
        ];
        if b.details.is_empty() {
            lines.push(muted_line(" No detailed answers available.", colors));
        }
        for (i, detail) in b.details.iter().enumerate().skip(b.scroll) {
            let (mark, color) = if detail.is_correct {
                ("✓", colors.success())
            } else {
                ("✗", colors.error())
            };
            lines.push(Line::from(vec![
                Span::styled(format!(" {mark} "), Style::default().fg(color)),
                Span::styled(
                    format!("{}. {}", i + 1, detail.question_text),
                    Style::default().add_modifier(Modifier::BOLD),
                ),
            ]));
            lines.push(Line::from(format!("     Your answer: {}", detail.user_answer)));
            if !detail.is_correct {
                lines.push(Line::from(format!("     Correct answer: {}", detail.correct_answer)));
            }
            if !detail.explanation.is_empty() {
                lines.push(muted_line(format!("     {}", detail.explanation), colors));
            }
        }
        Paragraph::new(lines)
            .wrap(Wrap { trim: false })
            .render(inner, buf);
    }
}

impl Widget for ResultsBrowserView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        match self.browser.view {
            ResultsView::List => self.render_list(area, buf),
            ResultsView::Detail => self.render_detail(area, buf),
        }
    }
}
