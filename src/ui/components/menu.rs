use ratatui::buffer::Buffer;
use ratatui::layout::{Alignment, Constraint, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget};

use crate::session::menu::{MENU_ITEMS, MainMenu};
use crate::ui::theme::Theme;

pub struct MainMenuView<'a> {
    pub menu: &'a MainMenu,
    pub theme: &'a Theme,
}

impl Widget for MainMenuView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;

        let block = Block::bordered()
            .border_style(Style::default().fg(colors.border()))
            .style(Style::default().bg(colors.bg()));
        let inner = block.inner(area);
        block.render(area, buf);

        let [title_area, _, items_area] = Layout::vertical([
            Constraint::Length(4),
            Constraint::Length(1),
            Constraint::Min(0),
        ])
        .areas(inner);

        Paragraph::new(vec![
            Line::from(""),
            Line::from(Span::styled(
                "pdfquiz",
                Style::default()
                    .fg(colors.accent())
                    .add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(
                "Practice tests from your PDFs",
                Style::default().fg(colors.fg()),
            )),
        ])
        .alignment(Alignment::Center)
        .render(title_area, buf);

        let rows = Layout::vertical(MENU_ITEMS.iter().map(|_| Constraint::Length(3))).split(items_area);
        for ((i, item), row) in MENU_ITEMS.iter().enumerate().zip(rows.iter()) {
            let selected = i == self.menu.selected;
            let marker = if selected { ">" } else { " " };
            let label_style = if selected {
                Style::default()
                    .fg(colors.accent())
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(colors.fg())
            };
            Paragraph::new(vec![
                Line::from(Span::styled(
                    format!(" {marker} [{}] {}", item.key, item.label),
                    label_style,
                )),
                Line::from(Span::styled(
                    format!("       {}", item.description),
                    Style::default().fg(colors.muted()),
                )),
            ])
            .render(*row, buf);
        }
    }
}
