use ratatui::layout::{Constraint, Layout, Rect};

const HINT_INDENT: &str = "  ";
const HINT_GAP: &str = "  ";

/// Header, one-line message strip, body and a footer sized to its hints.
pub struct AppLayout {
    pub header: Rect,
    pub message: Rect,
    pub main: Rect,
    pub footer: Rect,
}

impl AppLayout {
    pub fn new(area: Rect, footer_lines: u16) -> Self {
        let footer_height = footer_lines.max(1) + 2;
        let [header, message, main, footer] = Layout::vertical([
            Constraint::Length(3),
            Constraint::Length(1),
            Constraint::Min(4),
            Constraint::Length(footer_height),
        ])
        .areas(area);
        Self {
            header,
            message,
            main,
            footer,
        }
    }
}

/// Greedily packs key hints into as few lines as fit `width`.
pub fn pack_hint_lines(hints: &[&str], width: usize) -> Vec<String> {
    let mut lines: Vec<String> = Vec::new();
    if width == 0 {
        return lines;
    }
    let mut current = String::new();
    for hint in hints.iter().filter(|h| !h.is_empty()) {
        if current.is_empty() {
            current = format!("{HINT_INDENT}{hint}");
            continue;
        }
        let candidate = format!("{current}{HINT_GAP}{hint}");
        if candidate.chars().count() <= width {
            current = candidate;
        } else {
            lines.push(std::mem::replace(&mut current, format!("{HINT_INDENT}{hint}")));
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

/// A popup of the given percentage size, never smaller than a readable box
/// unless the terminal itself is smaller.
pub fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    const MIN_WIDTH: u16 = 40;
    const MIN_HEIGHT: u16 = 5;

    let width = (area.width.saturating_mul(percent_x.min(100)) / 100)
        .max(MIN_WIDTH)
        .min(area.width);
    let height = (area.height.saturating_mul(percent_y.min(100)) / 100)
        .max(MIN_HEIGHT)
        .min(area.height);
    Rect::new(
        area.x + (area.width - width) / 2,
        area.y + (area.height - height) / 2,
        width,
        height,
    )
}
