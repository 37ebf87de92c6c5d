//! Centralized theme module for TUI color constants and styles

use ratatui::prelude::*;

use crate::scoring::Rating;

/// Complete color palette for the TUI
#[derive(Debug, Clone)]
pub struct ThemeColors {
    // Weight gauge colors
    pub gauge_filled: Color,
    pub gauge_modified: Color,
    pub gauge_empty: Color,

    // Table colors
    pub row_alt_bg: Color,
    pub index_color: Color,

    // Styles
    pub header_style: Style,
    pub row_selected: Style,
    pub panel_focused: Style,
    pub panel_unfocused: Style,

    // General colors
    pub muted: Color,
    pub title_color: Color,
    pub read_only: Color,

    // Status bar colors
    pub status_bar_bg: Color,
    pub status_key_color: Color,
    pub flash_success: Color,
    pub flash_error: Color,

    // Chart colors
    pub industry_bar: Color,

    // Popup overlay colors
    pub popup_title: Style,
}

impl ThemeColors {
    pub fn dark() -> Self {
        Self {
            gauge_filled: Color::Cyan,
            gauge_modified: Color::Yellow,
            gauge_empty: Color::DarkGray,
            row_alt_bg: Color::Indexed(235),
            index_color: Color::DarkGray,
            header_style: Style::new().bold(),
            row_selected: Style::new().reversed(),
            panel_focused: Style::new().fg(Color::Cyan),
            panel_unfocused: Style::new().fg(Color::Indexed(238)),
            muted: Color::Gray,
            title_color: Color::Cyan,
            read_only: Color::Yellow,
            status_bar_bg: Color::Indexed(236),
            status_key_color: Color::Cyan,
            flash_success: Color::Green,
            flash_error: Color::Red,
            industry_bar: Color::Indexed(75),
            popup_title: Style::new().fg(Color::Cyan).bold(),
        }
    }

    /// Reference chart palette. NR's black is swapped for a gray that shows
    /// on a dark background.
    pub fn rating_color(&self, rating: Rating) -> Color {
        match rating {
            Rating::NotRated => Color::Indexed(244),
            _ => {
                let (r, g, b) = rating.rgb();
                Color::Rgb(r, g, b)
            }
        }
    }
}

impl Default for ThemeColors {
    fn default() -> Self {
        Self::dark()
    }
}
