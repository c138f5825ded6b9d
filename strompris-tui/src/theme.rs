//! Color and style tokens.
//!
//! Neon accents on a dark terminal: cyan for focus, green/pink for cheap and
//! expensive hours, orange for warnings. One fixed color per price zone so a
//! zone keeps its color across panels.

use ratatui::style::{Color, Modifier, Style};

use strompris_core::Zone;

pub const ACCENT: Color = Color::Rgb(0, 255, 255);
pub const POSITIVE: Color = Color::Rgb(0, 255, 128);
pub const NEGATIVE: Color = Color::Rgb(255, 20, 147);
pub const WARNING: Color = Color::Rgb(255, 140, 0);
pub const NEUTRAL: Color = Color::Rgb(147, 112, 219);
pub const MUTED: Color = Color::Rgb(100, 149, 237);
pub const TEXT: Color = Color::White;

pub fn accent() -> Style {
    Style::default().fg(ACCENT)
}

pub fn accent_bold() -> Style {
    accent().add_modifier(Modifier::BOLD)
}

pub fn muted() -> Style {
    Style::default().fg(MUTED)
}

pub fn text() -> Style {
    Style::default().fg(TEXT)
}

pub fn positive() -> Style {
    Style::default().fg(POSITIVE)
}

pub fn negative() -> Style {
    Style::default().fg(NEGATIVE)
}

pub fn warning() -> Style {
    Style::default().fg(WARNING)
}

pub fn panel_border(active: bool) -> Style {
    if active {
        accent()
    } else {
        muted()
    }
}

pub fn panel_title(active: bool) -> Style {
    if active {
        accent_bold()
    } else {
        muted()
    }
}

/// Series color for a zone.
pub fn zone_color(zone: Zone) -> Color {
    match zone {
        Zone::No1 => ACCENT,
        Zone::No2 => POSITIVE,
        Zone::No3 => WARNING,
        Zone::No4 => NEUTRAL,
        Zone::No5 => NEGATIVE,
    }
}

/// Color for a price relative to the range mean: below is cheap (green),
/// more than 20% above is expensive (pink).
pub fn price_color(price: f64, mean: f64) -> Color {
    if price <= mean {
        POSITIVE
    } else if price > mean * 1.2 {
        NEGATIVE
    } else {
        TEXT
    }
}
