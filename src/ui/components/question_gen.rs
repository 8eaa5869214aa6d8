use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Paragraph, Widget, Wrap};

use crate::session::question_gen::{GenStatus, QuestionGen};
use crate::ui::components::{muted_line, panel};
use crate::ui::theme::Theme;

pub struct QuestionGenView<'a> {
    pub generation: &'a QuestionGen,
    pub theme: &'a Theme,
}

impl Widget for QuestionGenView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;
        let g = self.generation;
        let block = panel(" Question Generation ", colors);
        let inner = block.inner(area);
        block.render(area, buf);

        let mut lines = vec![
            Line::from(format!(" Source: {}", g.wizard.file_name())),
            Line::from(format!(" Test: {}", g.wizard.name)),
            Line::from(format!(" Requested: {} question(s)", g.requested)),
            Line::from(""),
        ];
        match &g.status {
            GenStatus::Generating => {
                lines.push(Line::from(Span::styled(
                    " Generating questions...",
                    Style::default().fg(colors.warning()),
                )));
            }
            GenStatus::Failed(reason) => {
                lines.push(Line::from(Span::styled(
                    " Generation failed",
                    Style::default().fg(colors.error()).add_modifier(Modifier::BOLD),
                )));
                lines.push(Line::from(format!(" {reason}")));
                lines.push(Line::from(""));
                lines.push(muted_line(
                    " Press r to go back and retry, or q to return to the menu.",
                    colors,
                ));
            }
        }
        Paragraph::new(lines)
            .wrap(Wrap { trim: false })
            .render(inner, buf);
    }
}
