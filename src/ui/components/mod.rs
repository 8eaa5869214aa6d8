pub mod custom_wizard;
pub mod file_select;
pub mod menu;
pub mod pdf_wizard;
pub mod question_gen;
pub mod results;
pub mod test_run;
pub mod test_select;

use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Block;

use crate::ui::line_input::LineInput;
use crate::ui::theme::ThemeColors;

pub fn panel<'a>(title: impl Into<Line<'a>>, colors: &ThemeColors) -> Block<'a> {
    Block::bordered()
        .title(title)
        .border_style(Style::default().fg(colors.border()))
        .style(Style::default().bg(colors.bg()).fg(colors.fg()))
}

/// A list row with a `>` marker and highlight when selected.
pub fn list_line<'a>(text: impl Into<String>, selected: bool, colors: &ThemeColors) -> Line<'a> {
    let text = text.into();
    if selected {
        Line::from(Span::styled(
            format!(" > {text}"),
            Style::default()
                .fg(colors.selected_fg())
                .bg(colors.selected_bg())
                .add_modifier(Modifier::BOLD),
        ))
    } else {
        Line::from(Span::styled(format!("   {text}"), Style::default().fg(colors.fg())))
    }
}

/// `label: value` row.
pub fn field_line<'a>(label: &str, value: &str, selected: bool, colors: &ThemeColors) -> Line<'a> {
    list_line(format!("{label}: {value}"), selected, colors)
}

/// Prompt plus the editor text with a block cursor.
pub fn editor_lines<'a>(prompt: &str, input: &LineInput, colors: &ThemeColors) -> Vec<Line<'a>> {
    let (before, at, after) = input.render_parts();
    let cursor_style = Style::default().fg(colors.cursor_fg()).bg(colors.cursor_bg());
    let text_style = Style::default().fg(colors.fg());
    let mut spans = vec![
        Span::styled("   ", text_style),
        Span::styled(before.to_string(), text_style),
    ];
    match at {
        Some(ch) => {
            spans.push(Span::styled(ch.to_string(), cursor_style));
            spans.push(Span::styled(after.to_string(), text_style));
        }
        None => spans.push(Span::styled(" ", cursor_style)),
    }
    vec![
        Line::from(Span::styled(
            format!(" {prompt}"),
            Style::default().fg(colors.accent()).add_modifier(Modifier::BOLD),
        )),
        Line::from(spans),
    ]
}

pub fn muted_line<'a>(text: impl Into<String>, colors: &ThemeColors) -> Line<'a> {
    Line::from(Span::styled(text.into(), Style::default().fg(colors.muted())))
}

/// Range of rows to draw so that `selected` stays visible in `height` rows.
pub fn visible_window(selected: usize, len: usize, height: usize) -> (usize, usize) {
    if height == 0 || len == 0 {
        return (0, 0);
    }
    let start = (selected + 1).saturating_sub(height).min(len.saturating_sub(height));
    (start, (start + height).min(len))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_visible_window_follows_selection() {
        assert_eq!(visible_window(0, 3, 10), (0, 3));
        assert_eq!(visible_window(4, 20, 5), (0, 5));
        assert_eq!(visible_window(5, 20, 5), (1, 6));
        assert_eq!(visible_window(19, 20, 5), (15, 20));
        assert_eq!(visible_window(3, 0, 5), (0, 0));
        assert_eq!(visible_window(3, 10, 0), (0, 0));
    }
}
