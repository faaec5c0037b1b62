use ratatui::style::{Color, Modifier, Style};

use pdfchat_core::{FileState, Sender, StatusKind};

/// Color theme for the TUI.
pub struct Theme {
    pub success: Color,
    pub failure: Color,
    pub deleting: Color,
    pub user: Color,
    pub bot: Color,

    pub header_fg: Color,
    pub header_bg: Color,
    pub border: Color,
    pub focus_border: Color,
    pub text: Color,
    pub dim: Color,
    pub highlight_bg: Color,
    pub active: Color,
    pub spinner: Color,
    pub footer_fg: Color,
    pub footer_bg: Color,
}

impl Theme {
    /// Blue and green palette.
    pub fn ocean() -> Self {
        Self {
            success: Color::Green,
            failure: Color::Red,
            deleting: Color::Yellow,
            user: Color::LightBlue,
            bot: Color::Green,

            header_fg: Color::White,
            header_bg: Color::Blue,
            border: Color::DarkGray,
            focus_border: Color::LightBlue,
            text: Color::White,
            dim: Color::DarkGray,
            highlight_bg: Color::Rgb(25, 40, 70),
            active: Color::Cyan,
            spinner: Color::Cyan,
            footer_fg: Color::DarkGray,
            footer_bg: Color::Reset,
        }
    }

    pub fn status_color(&self, kind: StatusKind) -> Color {
        match kind {
            StatusKind::Success => self.success,
            StatusKind::Failure => self.failure,
        }
    }

    pub fn sender_style(&self, sender: Sender) -> Style {
        match sender {
            Sender::User => Style::default().fg(self.user).add_modifier(Modifier::BOLD),
            Sender::Bot => Style::default().fg(self.bot).add_modifier(Modifier::BOLD),
        }
    }

    pub fn file_style(&self, state: FileState) -> Style {
        match state {
            FileState::Present => Style::default().fg(self.text),
            FileState::Deleting => Style::default()
                .fg(self.deleting)
                .add_modifier(Modifier::DIM),
        }
    }

    pub fn pane_border_style(&self, focused: bool) -> Style {
        if focused {
            Style::default().fg(self.focus_border)
        } else {
            Style::default().fg(self.border)
        }
    }

    pub fn header_style(&self) -> Style {
        Style::default().fg(self.header_fg).bg(self.header_bg).add_modifier(Modifier::BOLD)
    }

    pub fn highlight_style(&self) -> Style {
        Style::default().bg(self.highlight_bg).add_modifier(Modifier::BOLD)
    }

    pub fn footer_style(&self) -> Style {
        Style::default().fg(self.footer_fg).bg(self.footer_bg)
    }
}
