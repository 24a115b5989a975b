//! Theme configuration for the TUI.
//!
//! Supports light and dark themes with automatic terminal detection. Band
//! colors are fixed across themes so a reading looks the same everywhere.

use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::block::BorderType;

use crate::data::{Rgb, StatusBand};

/// Color and style theme for the TUI.
///
/// Use [`Theme::auto_detect()`] for automatic theme selection based on
/// terminal background, or [`Theme::dark()`]/[`Theme::light()`] explicitly.
#[derive(Debug, Clone)]
pub struct Theme {
    /// Accent color for highlights and active elements.
    pub highlight: Color,
    /// Color for fetch errors.
    pub error: Color,
    /// Color for secondary text (labels, timestamps).
    pub muted: Color,
    /// Color for borders and separators.
    pub border: Color,
    /// Empty part of the gauge.
    pub gauge_track: Color,
    /// Style for section headings.
    pub header: Style,
    /// Style for the active tab.
    pub tab_active: Style,
    /// Style for inactive tabs.
    pub tab_inactive: Style,
    /// Border style (rounded, plain, etc.).
    pub border_type: BorderType,
}

impl Theme {
    /// Create a dark theme suitable for dark terminal backgrounds.
    pub fn dark() -> Self {
        Self {
            highlight: Color::Cyan,
            error: Color::Rgb(0xef, 0x9a, 0x9a),
            muted: Color::Gray,
            border: Color::Gray,
            gauge_track: Color::DarkGray,
            header: Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            tab_active: Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            tab_inactive: Style::default().fg(Color::Gray),
            border_type: BorderType::Rounded,
        }
    }

    /// Create a light theme suitable for light terminal backgrounds.
    pub fn light() -> Self {
        Self {
            highlight: Color::Blue,
            error: Color::Rgb(0xc6, 0x28, 0x28),
            muted: Color::DarkGray,
            border: Color::DarkGray,
            gauge_track: Color::Rgb(0xe0, 0xe0, 0xe0),
            header: Style::default().fg(Color::Blue).add_modifier(Modifier::BOLD),
            tab_active: Style::default().fg(Color::Blue).add_modifier(Modifier::BOLD),
            tab_inactive: Style::default().fg(Color::DarkGray),
            border_type: BorderType::Rounded,
        }
    }

    /// Auto-detect based on terminal background
    pub fn auto_detect() -> Self {
        match terminal_light::luma() {
            Ok(luma) if luma > 0.5 => Self::light(),
            _ => Self::dark(),
        }
    }

    /// Foreground color of a band.
    pub fn band_color(&self, band: StatusBand) -> Color {
        rgb(band.color())
    }

    /// Text in the band's color, bold unless loading.
    pub fn band_style(&self, band: StatusBand) -> Style {
        let style = Style::default().fg(self.band_color(band));
        if band.is_loading() {
            style
        } else {
            style.add_modifier(Modifier::BOLD)
        }
    }

    /// Badge style: band color as background with readable text on top.
    pub fn badge_style(&self, band: StatusBand) -> Style {
        let text = if band.wants_dark_text() {
            Color::Black
        } else {
            Color::White
        };
        Style::default()
            .bg(self.band_color(band))
            .fg(text)
            .add_modifier(Modifier::BOLD)
    }

    pub fn error_style(&self) -> Style {
        Style::default().fg(self.error).add_modifier(Modifier::BOLD)
    }
}

fn rgb(Rgb(r, g, b): Rgb) -> Color {
    Color::Rgb(r, g, b)
}
