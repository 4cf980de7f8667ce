//! Colors and text styles for both screens.

use ratatui::style::{Color, Modifier, Style};

/// Immutable set of styles, built once and handed to the renderer.
#[derive(Debug, Clone, Copy)]
pub struct Theme {
    pub title: Style,
    pub header: Style,
    pub row: Style,
    pub selected_row: Style,
    pub border: Style,
    pub help: Style,
    pub muted: Style,
    pub success: Style,
    pub error: Style,
    pub filter: Style,
    pub check: Style,
}

impl Theme {
    const PRIMARY: Color = Color::Indexed(86);
    const SECONDARY: Color = Color::Indexed(212);
    const SUCCESS: Color = Color::Indexed(42);
    const ERROR: Color = Color::Indexed(196);
    const MUTED: Color = Color::Indexed(241);
    const SELECTED: Color = Color::Indexed(219);
    const SELECTED_BG: Color = Color::Indexed(235);

    /// Style for a status line of the given severity.
    pub fn status(&self, is_error: bool) -> Style {
        if is_error {
            self.error
        } else {
            self.success
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            title: Style::default().fg(Self::PRIMARY).add_modifier(Modifier::BOLD),
            header: Style::default()
                .fg(Self::SECONDARY)
                .add_modifier(Modifier::BOLD),
            row: Style::default(),
            selected_row: Style::default()
                .fg(Self::SELECTED)
                .bg(Self::SELECTED_BG)
                .add_modifier(Modifier::BOLD),
            border: Style::default().fg(Self::MUTED),
            help: Style::default().fg(Self::MUTED),
            muted: Style::default().fg(Self::MUTED),
            success: Style::default().fg(Self::SUCCESS).add_modifier(Modifier::BOLD),
            error: Style::default().fg(Self::ERROR).add_modifier(Modifier::BOLD),
            filter: Style::default().fg(Self::PRIMARY).add_modifier(Modifier::BOLD),
            check: Style::default().fg(Self::SUCCESS).add_modifier(Modifier::BOLD),
        }
    }
}
