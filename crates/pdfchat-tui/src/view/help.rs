use ratatui::Frame;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};

use crate::theme::Theme;
use crate::view::centered_rect;

/// Render the help overlay as a centered popup.
pub fn render(f: &mut Frame, theme: &Theme) {
    let area = f.area();
    let popup = centered_rect(60, 26, area);

    let lines = vec![
        Line::from(Span::styled(
            " Keyboard Shortcuts ",
            Style::default()
                .fg(theme.header_fg)
                .bg(theme.header_bg)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        section_header("Files Pane", theme),
        key_line("j / ↓", "Move down", theme),
        key_line("k / ↑", "Move up", theme),
        key_line("g / G", "Go to top / bottom", theme),
        key_line("o / a", "Choose PDFs (paths or a directory)", theme),
        key_line("c", "Clear selection", theme),
        key_line("u", "Upload selection", theme),
        key_line("d / Del", "Delete highlighted file", theme),
        key_line("r", "Refresh file list", theme),
        key_line("R", "Rebuild search index", theme),
        Line::from(""),
        section_header("Chat Pane", theme),
        key_line("Enter", "Send question", theme),
        key_line("↑ / ↓", "Scroll transcript", theme),
        key_line("Esc", "Back to files", theme),
        Line::from(""),
        section_header("Global", theme),
        key_line("Tab", "Switch pane", theme),
        key_line("?", "Toggle this help", theme),
        key_line("q", "Quit (files pane)", theme),
        key_line("Ctrl+c", "Force quit", theme),
    ];

    let paragraph = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(theme.active))
                .title(" Help "),
        )
        .wrap(Wrap { trim: false });

    f.render_widget(Clear, popup);
    f.render_widget(paragraph, popup);
}

fn section_header<'a>(title: &'a str, theme: &Theme) -> Line<'a> {
    Line::from(Span::styled(
        format!("  {title}"),
        Style::default()
            .fg(theme.active)
            .add_modifier(Modifier::BOLD),
    ))
}

fn key_line<'a>(key: &'a str, desc: &'a str, theme: &Theme) -> Line<'a> {
    Line::from(vec![
        Span::styled(format!("    {key:<16}"), Style::default().fg(theme.text)),
        Span::styled(desc, Style::default().fg(theme.dim)),
    ])
}
