use tui::style::Color;

use crate::models::{CalendarEvent, Project};

pub const PROJECT_COLORS: [&str; 12] = [
    "#A8C5E3",
    "#F7B5CA",
    "#B5E7A0",
    "#FFD6A5",
    "#D4B5F7",
    "#FFB3BA",
    "#B5F1E7",
    "#FFC9A8",
    "#A8E6CF",
    "#C5B3E6",
    "#FFE5A8",
    "#E6B5D8",
];

pub const DEFAULT_EVENT_COLOR: &str = "#6B7280";

fn parse_hex(hex: &str) -> Option<(u8, u8, u8)> {
    let hex = hex.strip_prefix('#')?;
    if hex.len() != 6 {
        return None;
    }
    let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
    let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
    let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
    Some((r, g, b))
}

/// Black or white, whichever reads better on `hex`
pub fn contrast_color(hex: &str) -> &'static str {
    let (r, g, b) = parse_hex(hex).unwrap_or((0, 0, 0));
    let luminance = (0.299 * r as f64 + 0.587 * g as f64 + 0.114 * b as f64) / 255.0;
    if luminance > 0.5 { "#000000" } else { "#FFFFFF" }
}

pub fn to_terminal_color(hex: &str) -> Color {
    match parse_hex(hex) {
        Some((r, g, b)) => Color::Rgb(r, g, b),
        None => Color::Gray,
    }
}

/// Project colour wins over the event's own colour
pub fn event_color<'a>(event: &'a CalendarEvent, project: Option<&'a Project>) -> &'a str {
    project
        .map(|p| p.color.as_str())
        .or(event.color.as_deref())
        .unwrap_or(DEFAULT_EVENT_COLOR)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pastel_palette_gets_black_text() {
        for color in PROJECT_COLORS {
            assert_eq!(contrast_color(color), "#000000", "{}", color);
        }
    }

    #[test]
    fn dark_colors_get_white_text() {
        assert_eq!(contrast_color("#000000"), "#FFFFFF");
        assert_eq!(contrast_color(DEFAULT_EVENT_COLOR), "#FFFFFF");
    }

    #[test]
    fn terminal_color_parses_hex() {
        assert_eq!(to_terminal_color("#A8C5E3"), Color::Rgb(0xA8, 0xC5, 0xE3));
        assert_eq!(to_terminal_color("blue"), Color::Gray);
        assert_eq!(to_terminal_color("#12"), Color::Gray);
    }
}
