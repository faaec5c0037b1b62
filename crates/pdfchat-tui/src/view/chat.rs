use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};

use pdfchat_core::{ChatMessage, Sender};

use crate::app::{App, Focus};
use crate::theme::Theme;
use crate::view::spinner_char;

/// Render the chat pane: transcript above, input box below.
pub fn render(f: &mut Frame, area: Rect, app: &App) {
    let focused = app.focus == Focus::Chat && app.prompt.is_none();
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(app.theme.pane_border_style(focused))
        .title(" PDF Chatbot ");
    let inner = block.inner(area);
    f.render_widget(block, area);

    let chunks = Layout::vertical([Constraint::Min(3), Constraint::Length(3)]).split(inner);
    render_transcript(f, chunks[0], app);
    render_input(f, chunks[1], app, focused);
}

fn render_transcript(f: &mut Frame, area: Rect, app: &App) {
    let theme = &app.theme;
    let transcript = app.chat.transcript();

    if transcript.is_empty() && !app.chat.is_loading() {
        let empty = Paragraph::new(vec![
            Line::from(""),
            Line::from(Span::styled(
                "Start chatting about your PDFs!",
                Style::default().fg(theme.dim),
            )),
        ])
        .alignment(Alignment::Center);
        f.render_widget(empty, area);
        return;
    }

    let mut lines: Vec<Line> = Vec::new();
    for message in transcript {
        lines.extend(message_lines(message, theme));
        lines.push(Line::from(""));
    }
    if app.chat.is_loading() {
        lines.push(Line::from(Span::styled(
            format!("{} Thinking...", spinner_char(app.tick)),
            Style::default().fg(theme.spinner),
        )));
    }

    let height = wrapped_height(&lines, area.width);
    let max_offset = height.saturating_sub(area.height);
    let offset = max_offset.saturating_sub(app.chat_scroll);

    let paragraph = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .scroll((offset, 0));
    f.render_widget(paragraph, area);
}

fn message_lines<'a>(message: &'a ChatMessage, theme: &Theme) -> Vec<Line<'a>> {
    let label = match message.sender {
        Sender::User => "You: ",
        Sender::Bot => "Bot: ",
    };
    let text_style = match message.sender {
        Sender::User => Style::default().fg(theme.text),
        Sender::Bot => Style::default().fg(theme.bot),
    };

    let mut lines = Vec::new();
    for (i, part) in message.text.lines().enumerate() {
        let prefix = if i == 0 { label } else { "     " };
        lines.push(Line::from(vec![
            Span::styled(prefix, theme.sender_style(message.sender)),
            Span::styled(part, text_style),
        ]));
    }
    if lines.is_empty() {
        lines.push(Line::from(Span::styled(label, theme.sender_style(message.sender))));
    }
    lines
}

/// Rows the lines occupy once wrapped at `width` columns.
///
/// Counts characters per row, so it can undercount slightly when word
/// wrapping pushes a long word to the next row.
fn wrapped_height(lines: &[Line], width: u16) -> u16 {
    let width = width.max(1) as usize;
    let rows: usize = lines
        .iter()
        .map(|line| line.width().max(1).div_ceil(width))
        .sum();
    rows.min(u16::MAX as usize) as u16
}

fn render_input(f: &mut Frame, area: Rect, app: &App, focused: bool) {
    let theme = &app.theme;
    let loading = app.chat.is_loading();
    let title = if loading {
        " Thinking... "
    } else {
        " Ask a question about your PDFs... "
    };

    let draft = app.chat.draft();
    let inner_width = area.width.saturating_sub(2) as usize;
    // Keep the end of a long draft visible
    let visible: String = {
        let count = draft.chars().count();
        let skip = count.saturating_sub(inner_width.saturating_sub(1));
        draft.chars().skip(skip).collect()
    };

    let style = if loading {
        Style::default().fg(theme.dim)
    } else {
        Style::default().fg(theme.text)
    };
    let input = Paragraph::new(Span::styled(visible.clone(), style)).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(theme.pane_border_style(focused))
            .title(Span::styled(title, Style::default().add_modifier(Modifier::ITALIC))),
    );
    f.render_widget(input, area);

    if focused && !loading {
        let x = area.x + 1 + visible.chars().count() as u16;
        f.set_cursor_position((x.min(area.right().saturating_sub(2)), area.y + 1));
    }
}
