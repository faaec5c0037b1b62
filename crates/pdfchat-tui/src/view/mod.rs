pub mod chat;
pub mod files;
pub mod help;
pub mod prompt;

use ratatui::Frame;
use ratatui::layout::{Constraint, Flex, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::app::{App, Focus};

/// Spinner frames for animated progress indication.
const SPINNER_FRAMES: &[char] = &['⠋', '⠙', '⠹', '⠸', '⠼', '⠴', '⠦', '⠧', '⠇', '⠏'];

/// Get the current spinner character based on a tick counter.
pub fn spinner_char(tick: usize) -> char {
    SPINNER_FRAMES[tick % SPINNER_FRAMES.len()]
}

/// Truncate a string to fit in `max_width` columns, appending "…" if truncated.
pub fn truncate(s: &str, max_width: usize) -> String {
    if max_width == 0 {
        return String::new();
    }
    if s.chars().count() <= max_width {
        return s.to_string();
    }
    let mut truncated: String = s.chars().take(max_width.saturating_sub(1)).collect();
    truncated.push('…');
    truncated
}

/// Create a centered rectangle of the given width (columns) and height (rows).
pub fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let vertical = Layout::vertical([Constraint::Length(height)])
        .flex(Flex::Center)
        .split(area);
    Layout::horizontal([Constraint::Length(width)])
        .flex(Flex::Center)
        .split(vertical[0])[0]
}

/// Render the two panes with header and footer.
pub fn render(f: &mut Frame, app: &App) {
    let chunks = Layout::vertical([
        Constraint::Length(1), // header
        Constraint::Min(5),    // panes
        Constraint::Length(1), // footer
    ])
    .split(f.area());

    render_header(f, chunks[0], app);

    let panes = Layout::horizontal([Constraint::Percentage(40), Constraint::Percentage(60)])
        .split(chunks[1]);
    files::render(f, panes[0], app);
    chat::render(f, panes[1], app);

    render_footer(f, chunks[2], app);
}

fn render_header(f: &mut Frame, area: Rect, app: &App) {
    let theme = &app.theme;
    let mut spans = vec![
        Span::styled(" PDFCHAT ", theme.header_style()),
        Span::styled(
            format!(" {}", app.server),
            Style::default().fg(theme.text).add_modifier(Modifier::BOLD),
        ),
    ];
    if app.listing {
        spans.push(Span::styled(
            format!("  {} listing files", spinner_char(app.tick)),
            Style::default().fg(theme.spinner),
        ));
    }
    if app.reprocessing {
        spans.push(Span::styled(
            format!("  {} reindexing", spinner_char(app.tick)),
            Style::default().fg(theme.spinner),
        ));
    }
    f.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn render_footer(f: &mut Frame, area: Rect, app: &App) {
    let theme = &app.theme;
    let mut spans = Vec::new();

    if let Some(notice) = &app.notice {
        let color = if notice.failure { theme.failure } else { theme.success };
        spans.push(Span::styled(
            format!(" [{}] {} ", notice.at.format("%H:%M:%S"), notice.text),
            Style::default().fg(color),
        ));
    }

    let hints = match (app.prompt.is_some(), app.focus) {
        (true, _) => " | Enter:select  Esc:cancel",
        (false, Focus::Files) => {
            " | o:choose  u:upload  d:delete  r:refresh  R:reindex  Tab:chat  ?:help  q:quit"
        }
        (false, Focus::Chat) => " | Enter:send  ↑/↓:scroll  Tab/Esc:files  Ctrl+c:quit",
    };
    spans.push(Span::styled(hints, theme.footer_style()));

    f.render_widget(Paragraph::new(Line::from(spans)), area);
}
