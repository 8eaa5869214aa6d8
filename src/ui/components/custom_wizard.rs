use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Paragraph, Widget, Wrap};

use crate::session::custom_wizard::{CustomStep, CustomWizard};
use crate::store::schema::{OPTION_LETTERS, QuestionType};
use crate::ui::components::{editor_lines, field_line, muted_line, panel};
use crate::ui::theme::Theme;

pub struct CustomWizardView<'a> {
    pub wizard: &'a CustomWizard,
    pub theme: &'a Theme,
}

fn or_unset(value: &str) -> &str {
    if value.trim().is_empty() { "(not set)" } else { value }
}

impl CustomWizardView<'_> {
    fn info_lines(&self) -> Vec<Line<'static>> {
        let (w, colors) = (self.wizard, &self.theme.colors);
        vec![
            field_line("Test name", &w.name, w.cursor == 0, colors),
            field_line("Description", or_unset(&w.description), w.cursor == 1, colors),
        ]
    }

    fn question_lines(&self) -> Vec<Line<'static>> {
        let (w, colors) = (self.wizard, &self.theme.colors);
        let d = &w.draft;
        let mut lines = vec![
            muted_line(format!(" {} question(s) saved", w.questions.len()), colors),
            Line::from(""),
            field_line("Type", d.kind.display_name(), w.cursor == 0, colors),
            field_line("Question", or_unset(&d.text), w.cursor == 1, colors),
        ];
        if d.kind == QuestionType::MultipleChoice {
            let options = d
                .options
                .iter()
                .zip(OPTION_LETTERS)
                .map(|(o, l)| format!("{l}) {}", or_unset(o)))
                .collect::<Vec<_>>()
                .join("  ");
            lines.push(field_line("Options", &options, w.cursor == 2, colors));
        } else {
            lines.push(field_line("Options", "(not used for this type)", w.cursor == 2, colors));
        }
        lines.push(field_line("Correct answer", or_unset(&d.answer), w.cursor == 3, colors));
        lines.push(field_line("Explanation", or_unset(&d.explanation), w.cursor == 4, colors));
        lines
    }

    fn review_lines(&self) -> Vec<Line<'static>> {
        let (w, colors) = (self.wizard, &self.theme.colors);
        let mut lines = vec![
            Line::from(format!(" {} - {}", w.name, w.description)),
            Line::from(""),
        ];
        for (i, q) in w.questions.iter().enumerate() {
            lines.push(Line::from(Span::styled(
                format!(" {}. [{}] {}", i + 1, q.question_type.display_name(), q.question_text),
                Style::default().add_modifier(Modifier::BOLD),
            )));
            for (letter, option) in OPTION_LETTERS.iter().zip(&q.options) {
                if !option.is_empty() {
                    lines.push(Line::from(format!("      {letter}) {option}")));
                }
            }
            lines.push(muted_line(format!("    Answer: {}", q.correct_answer), colors));
        }
        lines.push(Line::from(""));
        lines.push(Line::from(" Press Enter to create the test."));
        lines
    }
}

impl Widget for CustomWizardView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;
        let (number, title) = match self.wizard.step {
            CustomStep::TestInfo => (1, "Test information"),
            CustomStep::Questions => (2, "Questions"),
            CustomStep::Review => (3, "Review"),
        };
        let block = panel(format!(" Step {number} of 3: {title} "), colors);
        let inner = block.inner(area);
        block.render(area, buf);

        let mut lines = match self.wizard.step {
            CustomStep::TestInfo => self.info_lines(),
            CustomStep::Questions => self.question_lines(),
            CustomStep::Review => self.review_lines(),
        };
        if let Some((field, input)) = &self.wizard.editor {
            lines.push(Line::from(""));
            lines.extend(editor_lines(&field.prompt(), input, colors));
        }
        Paragraph::new(lines)
            .wrap(Wrap { trim: false })
            .render(inner, buf);
    }
}
