pub mod components;
pub mod layout;
pub mod line_input;
pub mod theme;

use ratatui::Frame;
use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Clear, Paragraph, Wrap};

use crate::app::{App, Screen};
use crate::session::Message;
use crate::session::custom_wizard::CustomStep;
use crate::ui::components::custom_wizard::CustomWizardView;
use crate::ui::components::file_select::FileSelectView;
use crate::ui::components::menu::MainMenuView;
use crate::ui::components::pdf_wizard::PdfWizardView;
use crate::ui::components::question_gen::QuestionGenView;
use crate::ui::components::results::ResultsBrowserView;
use crate::ui::components::test_run::TestRunView;
use crate::ui::components::test_select::TestSelectView;
use crate::ui::layout::{AppLayout, centered_rect, pack_hint_lines};
use crate::ui::theme::Theme;

pub fn render(frame: &mut Frame, app: &App) {
    let area = frame.area();
    let theme = &app.theme;
    let colors = &theme.colors;
    frame.render_widget(
        Block::default().style(Style::default().bg(colors.bg()).fg(colors.fg())),
        area,
    );

    let hints = pack_hint_lines(app.hints(), area.width.saturating_sub(2) as usize);
    let layout = AppLayout::new(area, hints.len() as u16);

    render_header(frame, layout.header, &screen_title(app), theme);
    if let Some(message) = current_message(app) {
        render_message(frame, layout.message, message, theme);
    }

    let main = layout.main;
    match &app.screen {
        Screen::MainMenu => frame.render_widget(MainMenuView { menu: &app.menu, theme }, main),
        Screen::FileSelection => frame.render_widget(
            FileSelectView {
                browser: &app.files,
                theme,
            },
            main,
        ),
        Screen::PdfProcess(wizard) => frame.render_widget(
            PdfWizardView {
                wizard,
                preview_length: app.services.config.preview_length,
                theme,
            },
            main,
        ),
        Screen::QuestionGen(generation) => {
            frame.render_widget(QuestionGenView { generation, theme }, main)
        }
        Screen::CustomQuestion(wizard) => frame.render_widget(CustomWizardView { wizard, theme }, main),
        Screen::TestSelection(select) => frame.render_widget(TestSelectView { select, theme }, main),
        Screen::TestTaking(run) => frame.render_widget(TestRunView { run, theme }, main),
        Screen::TestResults(browser) => frame.render_widget(ResultsBrowserView { browser, theme }, main),
    }

    let footer_lines: Vec<Line> = hints
        .into_iter()
        .map(|h| Line::from(Span::styled(h, Style::default().fg(colors.muted()))))
        .collect();
    frame.render_widget(
        Paragraph::new(footer_lines).block(
            Block::bordered()
                .border_style(Style::default().fg(colors.border()))
                .style(Style::default().bg(colors.bg())),
        ),
        layout.footer,
    );

    if let Some(busy) = busy_text(app) {
        render_processing(frame, area, busy, theme);
    }
}

fn screen_title(app: &App) -> String {
    match &app.screen {
        Screen::MainMenu => "PDF Test Generator".to_string(),
        Screen::FileSelection => "Select PDF File".to_string(),
        Screen::PdfProcess(w) => format!("Process PDF - Step {} of 3", w.step.number()),
        Screen::QuestionGen(_) => "Generate Questions".to_string(),
        Screen::CustomQuestion(w) => match w.step {
            CustomStep::TestInfo => "Create Custom Test".to_string(),
            CustomStep::Questions => {
                format!("Create Questions ({} saved)", w.questions.len())
            }
            CustomStep::Review => "Review Test".to_string(),
        },
        Screen::TestSelection(s) => s.title().to_string(),
        Screen::TestTaking(run) => format!("Taking: {}", run.test.name),
        Screen::TestResults(_) => "Test Results".to_string(),
    }
}

fn current_message(app: &App) -> Option<&Message> {
    match &app.screen {
        Screen::MainMenu => app.menu.flash.as_ref(),
        Screen::FileSelection => app.files.message.as_ref(),
        Screen::PdfProcess(w) => w.message.as_ref(),
        Screen::QuestionGen(_) => None,
        Screen::CustomQuestion(w) => w.message.as_ref(),
        Screen::TestSelection(s) => s.message.as_ref(),
        Screen::TestTaking(run) => run.message.as_ref(),
        Screen::TestResults(b) => b.message.as_ref(),
    }
}

fn busy_text(app: &App) -> Option<&'static str> {
    match &app.screen {
        Screen::PdfProcess(w) if w.loading => Some("Extracting text from PDF..."),
        Screen::QuestionGen(g) if g.is_generating() => {
            Some("Generating questions... This may take a few moments.")
        }
        _ => None,
    }
}

fn render_header(frame: &mut Frame, area: Rect, title: &str, theme: &Theme) {
    let colors = &theme.colors;
    let header = Paragraph::new(Line::from(Span::styled(
        format!(" {title}"),
        Style::default()
            .fg(colors.header_fg())
            .add_modifier(Modifier::BOLD),
    )))
    .block(
        Block::bordered()
            .border_style(Style::default().fg(colors.border_focused()))
            .style(Style::default().bg(colors.header_bg())),
    );
    frame.render_widget(header, area);
}

fn render_message(frame: &mut Frame, area: Rect, message: &Message, theme: &Theme) {
    let color = if message.is_error() {
        theme.colors.error()
    } else {
        theme.colors.success()
    };
    frame.render_widget(
        Paragraph::new(Span::styled(format!(" {}", message.text()), Style::default().fg(color))),
        area,
    );
}

fn render_processing(frame: &mut Frame, area: Rect, text: &str, theme: &Theme) {
    let colors = &theme.colors;
    let popup = centered_rect(50, 20, area);
    frame.render_widget(Clear, popup);
    frame.render_widget(
        Paragraph::new(vec![
            Line::from(""),
            Line::from(Span::styled(text.to_string(), Style::default().fg(colors.warning()))),
        ])
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .block(
            Block::bordered()
                .title(" Processing... ")
                .border_style(Style::default().fg(colors.accent()))
                .style(Style::default().bg(colors.bg())),
        ),
        popup,
    );
}
