use std::fs;
use std::path::Path;

use ratatui::style::Color;
use rust_embed::Embed;
use serde::{Deserialize, Serialize};

use crate::config::config_dir;

pub const DEFAULT_THEME: &str = "default";

#[derive(Embed)]
#[folder = "assets/themes/"]
struct ThemeAssets;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Theme {
    pub name: String,
    pub colors: ThemeColors,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ThemeColors {
    pub bg: String,
    pub fg: String,
    pub muted: String,
    pub accent: String,
    pub border: String,
    pub border_focused: String,
    pub header_bg: String,
    pub header_fg: String,
    pub selected_bg: String,
    pub selected_fg: String,
    pub cursor_bg: String,
    pub cursor_fg: String,
    pub error: String,
    pub warning: String,
    pub success: String,
}

impl Theme {
    /// A user theme in `<config_dir>/themes/` wins over a bundled one.
    pub fn load(name: &str) -> Option<Self> {
        let file = format!("{name}.toml");
        if let Some(theme) = parse_file(&config_dir().join("themes").join(&file)) {
            return Some(theme);
        }
        let bundled = ThemeAssets::get(&file)?;
        let content = std::str::from_utf8(bundled.data.as_ref()).ok()?;
        match toml::from_str(content) {
            Ok(theme) => Some(theme),
            Err(e) => {
                tracing::warn!(theme = name, error = %e, "bundled theme is invalid");
                None
            }
        }
    }

    pub fn available_themes() -> Vec<String> {
        let mut names: Vec<String> = ThemeAssets::iter()
            .filter_map(|f| f.strip_suffix(".toml").map(str::to_string))
            .collect();
        names.sort();
        names
    }
}

fn parse_file(path: &Path) -> Option<Theme> {
    let content = fs::read_to_string(path).ok()?;
    match toml::from_str(&content) {
        Ok(theme) => Some(theme),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "ignoring invalid user theme");
            None
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::load(DEFAULT_THEME).unwrap_or_else(|| Self {
            name: DEFAULT_THEME.to_string(),
            colors: ThemeColors::default(),
        })
    }
}

impl Default for ThemeColors {
    fn default() -> Self {
        Self {
            bg: "#1e1e2e".to_string(),
            fg: "#cdd6f4".to_string(),
            muted: "#7f849c".to_string(),
            accent: "#89b4fa".to_string(),
            border: "#45475a".to_string(),
            border_focused: "#89b4fa".to_string(),
            header_bg: "#313244".to_string(),
            header_fg: "#cdd6f4".to_string(),
            selected_bg: "#45475a".to_string(),
            selected_fg: "#f9e2af".to_string(),
            cursor_bg: "#f5e0dc".to_string(),
            cursor_fg: "#1e1e2e".to_string(),
            error: "#f38ba8".to_string(),
            warning: "#f9e2af".to_string(),
            success: "#a6e3a1".to_string(),
        }
    }
}

macro_rules! color_accessors {
    ($($field:ident),* $(,)?) => {
        $(pub fn $field(&self) -> Color { Self::parse_color(&self.$field) })*
    };
}

impl ThemeColors {
    /// `#rrggbb` to an RGB color; anything else falls back to white.
    pub fn parse_color(hex: &str) -> Color {
        let hex = hex.trim_start_matches('#');
        let channel = |i: usize| hex.get(i..i + 2).and_then(|c| u8::from_str_radix(c, 16).ok());
        match (hex.len(), channel(0), channel(2), channel(4)) {
            (6, Some(r), Some(g), Some(b)) => Color::Rgb(r, g, b),
            _ => Color::White,
        }
    }

    color_accessors!(
        bg,
        fg,
        muted,
        accent,
        border,
        border_focused,
        header_bg,
        header_fg,
        selected_bg,
        selected_fg,
        cursor_bg,
        cursor_fg,
        error,
        warning,
        success,
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bundled_themes_parse() {
        let names = Theme::available_themes();
        assert_eq!(names, vec!["default", "light"]);
        for name in names {
            assert!(Theme::load(&name).is_some(), "theme {name} should load");
        }
    }

    #[test]
    fn test_unknown_theme_is_none() {
        assert!(Theme::load("no-such-theme").is_none());
        assert_eq!(Theme::default().name, DEFAULT_THEME);
    }

    #[test]
    fn test_parse_color() {
        assert_eq!(ThemeColors::parse_color("#102030"), Color::Rgb(16, 32, 48));
        assert_eq!(ThemeColors::parse_color("zzzzzz"), Color::White);
        assert_eq!(ThemeColors::parse_color("#fff"), Color::White);
    }
}
