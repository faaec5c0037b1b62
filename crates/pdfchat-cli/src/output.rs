use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use owo_colors::OwoColorize;

use pdfchat_core::{FileEntry, FileState, StatusMessage, wire_name};

/// Terminal output helpers. Colors are dropped when disabled so piped
/// output stays plain.
#[derive(Debug, Clone, Copy)]
pub struct Printer {
    pub color: bool,
}

impl Printer {
    pub fn new(no_color: bool) -> Self {
        let color = !no_color && std::env::var_os("NO_COLOR").is_none();
        Self { color }
    }

    /// A spinner on stderr that ticks until finished or dropped. Hidden when
    /// stderr is not a terminal.
    pub fn spinner(&self, message: &str) -> ProgressBar {
        let pb = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner()
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", " "])
            .template("{spinner:.cyan} {msg}")
        {
            pb.set_style(style);
        }
        pb.set_message(message.to_string());
        pb.enable_steady_tick(Duration::from_millis(100));
        pb
    }

    pub fn success(&self, text: &str) -> String {
        if self.color {
            text.green().bold().to_string()
        } else {
            text.to_string()
        }
    }

    pub fn failure(&self, text: &str) -> String {
        if self.color {
            text.red().bold().to_string()
        } else {
            text.to_string()
        }
    }

    pub fn dim(&self, text: &str) -> String {
        if self.color {
            text.dimmed().to_string()
        } else {
            text.to_string()
        }
    }

    pub fn label(&self, text: &str) -> String {
        if self.color {
            text.cyan().bold().to_string()
        } else {
            text.to_string()
        }
    }

    pub fn status(&self, status: &StatusMessage) -> String {
        if status.is_failure() {
            self.failure(&status.text)
        } else {
            self.success(&status.text)
        }
    }

    /// One line per known file: display name, and the full identifier when
    /// it differs.
    pub fn file_line(&self, entry: &FileEntry) -> String {
        let name = wire_name(&entry.identifier);
        let mut line = format!("  {name}");
        if name != entry.identifier {
            line.push_str(&format!("  {}", self.dim(&entry.identifier)));
        }
        if entry.state == FileState::Deleting {
            line.push_str(&format!("  {}", self.dim("(deleting)")));
        }
        line
    }
}
