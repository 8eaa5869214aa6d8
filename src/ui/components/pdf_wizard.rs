use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Paragraph, Widget, Wrap};

use crate::pdf::processor::text_summary;
use crate::session::pdf_wizard::{ConfigField, PdfWizard, WizardStep};
use crate::store::schema::QuestionType;
use crate::ui::components::{editor_lines, field_line, muted_line, panel};
use crate::ui::theme::Theme;

pub struct PdfWizardView<'a> {
    pub wizard: &'a PdfWizard,
    pub preview_length: usize,
    pub theme: &'a Theme,
}

impl PdfWizardView<'_> {
    fn type_summary(&self) -> String {
        QuestionType::ALL
            .iter()
            .map(|&kind| {
                let mark = if self.wizard.types.is_enabled(kind) { "x" } else { " " };
                format!("[{mark}] {}", kind.display_name())
            })
            .collect::<Vec<_>>()
            .join("  ")
    }

    fn field_value(&self, field: ConfigField) -> String {
        let w = self.wizard;
        match field {
            ConfigField::Count => w.count.to_string(),
            ConfigField::Types => self.type_summary(),
            ConfigField::Name => w.name.clone(),
            ConfigField::Description => w.description.clone(),
        }
    }
}

fn field_label(field: ConfigField) -> &'static str {
    match field {
        ConfigField::Count => "Number of questions",
        ConfigField::Types => "Question types",
        ConfigField::Name => "Test name",
        ConfigField::Description => "Description",
    }
}

impl Widget for PdfWizardView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;
        let w = self.wizard;
        let block = panel(format!(" {} ", w.file_name()), colors);
        let inner = block.inner(area);
        block.render(area, buf);

        let step_title = match w.step {
            WizardStep::Extract => "Extract text",
            WizardStep::Configure => "Configure questions",
            WizardStep::Generate => "Generate",
        };
        let mut lines = vec![Line::from(Span::styled(
            format!(" Step {} of 3: {step_title}", w.step.number()),
            Style::default().fg(colors.accent()).add_modifier(Modifier::BOLD),
        ))];
        if let Some(info) = &w.info {
            let title = info.title.as_deref().unwrap_or("untitled");
            lines.push(muted_line(format!(" {title} - {} page(s)", info.pages), colors));
        }
        lines.push(Line::from(""));

        match w.step {
            WizardStep::Extract => {
                let prompt = if w.text.is_some() {
                    " Text already extracted. Press Enter to continue."
                } else {
                    " Press Enter to extract text from this PDF."
                };
                lines.push(Line::from(prompt));
            }
            WizardStep::Configure => {
                for (i, field) in ConfigField::ALL.into_iter().enumerate() {
                    lines.push(field_line(
                        field_label(field),
                        &self.field_value(field),
                        i == w.cursor,
                        colors,
                    ));
                }
                if let Some((field, input)) = &w.editor {
                    lines.push(Line::from(""));
                    lines.extend(editor_lines(field.prompt(), input, colors));
                }
                if let Some(text) = &w.text {
                    lines.push(Line::from(""));
                    lines.push(muted_line(" Preview:", colors));
                    lines.push(Line::from(format!(
                        " {}",
                        text_summary(text, self.preview_length)
                    )));
                }
            }
            WizardStep::Generate => {
                for field in ConfigField::ALL {
                    lines.push(field_line(field_label(field), &self.field_value(field), false, colors));
                }
                lines.push(Line::from(""));
                lines.push(Line::from(" Press Enter to generate questions."));
            }
        }
        Paragraph::new(lines)
            .wrap(Wrap { trim: false })
            .render(inner, buf);
    }
}
