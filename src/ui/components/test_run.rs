use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Paragraph, Widget, Wrap};

use crate::engine::scoring::{format_duration, grade};
use crate::session::test_run::{RunMode, TestRun};
use crate::store::schema::{OPTION_LETTERS, QuestionType};
use crate::ui::components::{editor_lines, list_line, muted_line, panel};
use crate::ui::theme::Theme;

pub struct TestRunView<'a> {
    pub run: &'a TestRun,
    pub theme: &'a Theme,
}

impl TestRunView<'_> {
    fn answering_lines(&self) -> Vec<Line<'static>> {
        let (run, colors) = (self.run, &self.theme.colors);
        let Some(question) = run.current_question() else {
            return Vec::new();
        };
        let mut lines = vec![
            muted_line(format!(" {}", run.progress_line()), colors),
            Line::from(""),
            Line::from(Span::styled(
                format!(" {}", question.question_text),
                Style::default().add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
        ];
        match question.question_type {
            QuestionType::MultipleChoice => {
                for (i, (letter, option)) in OPTION_LETTERS.iter().zip(&question.options).enumerate() {
                    lines.push(list_line(format!("{letter}) {option}"), i == run.cursor, colors));
                }
            }
            QuestionType::TrueFalse => {
                lines.push(list_line("True", run.cursor == 0, colors));
                lines.push(list_line("False", run.cursor == 1, colors));
            }
            QuestionType::ShortAnswer => {
                lines.extend(editor_lines("Your answer:", &run.answer_input, colors));
            }
        }
        lines
    }

    fn finished_lines(&self) -> Vec<Line<'static>> {
        let (run, colors) = (self.run, &self.theme.colors);
        let (_, percent) = run.score();
        vec![
            Line::from(Span::styled(
                " Test complete!",
                Style::default().fg(colors.success()).add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
            Line::from(format!(" {}", run.score_line())),
            Line::from(format!(" Grade: {}", grade(percent))),
            Line::from(format!(" Time: {}", format_duration(run.elapsed()))),
            Line::from(""),
            muted_line(" Press Enter to save and return to the menu, r to review answers.", colors),
        ]
    }

    fn review_lines(&self, index: usize) -> Vec<Line<'static>> {
        let (run, colors) = (self.run, &self.theme.colors);
        let Some(question) = run.questions.get(index) else {
            return Vec::new();
        };
        let answer = run
            .answers
            .get(&question.id)
            .map(|a| TestRun::answer_label(question, a))
            .unwrap_or_else(|| "(no answer)".to_string());
        let verdict = run.review_verdict(index).unwrap_or_default();
        let verdict_color = if verdict.starts_with('✓') {
            colors.success()
        } else {
            colors.error()
        };
        let mut lines = vec![
            muted_line(format!(" Review {} of {}", index + 1, run.questions.len()), colors),
            Line::from(""),
            Line::from(Span::styled(
                format!(" {}", question.question_text),
                Style::default().add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
            Line::from(format!(" Your answer: {answer}")),
            Line::from(format!(
                " Correct answer: {}",
                TestRun::answer_label(question, &question.correct_answer)
            )),
            Line::from(Span::styled(
                format!(" {verdict}"),
                Style::default().fg(verdict_color).add_modifier(Modifier::BOLD),
            )),
        ];
        if !question.explanation.is_empty() {
            lines.push(Line::from(""));
            lines.push(Line::from(format!(" Explanation: {}", question.explanation)));
        }
        lines
    }
}

impl Widget for TestRunView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = panel(format!(" {} ", self.run.test.name), &self.theme.colors);
        let inner = block.inner(area);
        block.render(area, buf);

        let lines = match self.run.mode {
            RunMode::Answering => self.answering_lines(),
            RunMode::Finished => self.finished_lines(),
            RunMode::Review(index) => self.review_lines(index),
        };
        Paragraph::new(lines)
            .wrap(Wrap { trim: false })
            .render(inner, buf);
    }
}
