use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph};

use pdfchat_core::{FileState, MAX_UPLOAD_FILES};

use crate::app::{App, Focus};
use crate::view::{spinner_char, truncate};

/// Render the files pane: uploaded files, pending selection, upload status.
pub fn render(f: &mut Frame, area: Rect, app: &App) {
    let focused = app.focus == Focus::Files && app.prompt.is_none();
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(app.theme.pane_border_style(focused))
        .title(" Files ");
    let inner = block.inner(area);
    f.render_widget(block, area);

    let pending_rows = app.uploads.pending().len().max(1) as u16;
    let chunks = Layout::vertical([
        Constraint::Length(1),               // uploaded heading
        Constraint::Min(2),                  // uploaded list
        Constraint::Length(1),               // selected heading
        Constraint::Length(pending_rows),    // selected list
        Constraint::Length(1),               // status
    ])
    .split(inner);

    render_uploaded(f, chunks[0], chunks[1], app, focused);
    render_pending(f, chunks[2], chunks[3], app);
    render_status(f, chunks[4], app);
}

fn heading<'a>(text: String, app: &App) -> Paragraph<'a> {
    Paragraph::new(Line::from(Span::styled(
        text,
        Style::default()
            .fg(app.theme.active)
            .add_modifier(Modifier::BOLD),
    )))
}

fn render_uploaded(f: &mut Frame, heading_area: Rect, area: Rect, app: &App, focused: bool) {
    let theme = &app.theme;
    let known = app.uploads.known();
    f.render_widget(
        heading(format!("Uploaded files ({})", known.len()), app),
        heading_area,
    );

    if known.is_empty() {
        let text = if app.listing {
            format!("{} loading…", spinner_char(app.tick))
        } else {
            "No uploaded files".to_string()
        };
        f.render_widget(
            Paragraph::new(Span::styled(text, Style::default().fg(theme.dim))),
            area,
        );
        return;
    }

    let width = area.width as usize;
    let items: Vec<ListItem> = known
        .iter()
        .map(|entry| {
            let style = theme.file_style(entry.state);
            let line = match entry.state {
                FileState::Present => Line::from(Span::styled(
                    truncate(&entry.identifier, width.saturating_sub(2)),
                    style,
                )),
                FileState::Deleting => Line::from(vec![
                    Span::styled(
                        truncate(&entry.identifier, width.saturating_sub(14)),
                        style,
                    ),
                    Span::styled(
                        format!(" {} deleting", spinner_char(app.tick)),
                        Style::default().fg(theme.deleting),
                    ),
                ]),
            };
            ListItem::new(line)
        })
        .collect();

    let mut list = List::new(items);
    if focused {
        list = list.highlight_style(theme.highlight_style()).highlight_symbol("› ");
    }
    let mut state = ListState::default();
    state.select(Some(app.file_cursor));
    f.render_stateful_widget(list, area, &mut state);
}

fn render_pending(f: &mut Frame, heading_area: Rect, area: Rect, app: &App) {
    let theme = &app.theme;
    let pending = app.uploads.pending();
    f.render_widget(
        heading(
            format!("Selected ({}/{MAX_UPLOAD_FILES})", pending.len()),
            app,
        ),
        heading_area,
    );

    if pending.is_empty() {
        f.render_widget(
            Paragraph::new(Span::styled(
                "none, press o to choose PDFs",
                Style::default().fg(theme.dim),
            )),
            area,
        );
        return;
    }

    let width = area.width as usize;
    let lines: Vec<Line> = pending
        .iter()
        .map(|file| {
            Line::from(Span::styled(
                truncate(&file.name, width),
                Style::default().fg(theme.text),
            ))
        })
        .collect();
    f.render_widget(Paragraph::new(lines), area);
}

fn render_status(f: &mut Frame, area: Rect, app: &App) {
    let theme = &app.theme;
    let line = if app.uploads.is_loading() {
        Line::from(Span::styled(
            format!("{} Uploading...", spinner_char(app.tick)),
            Style::default().fg(theme.spinner),
        ))
    } else if let Some(status) = app.uploads.status() {
        Line::from(Span::styled(
            status.text.clone(),
            Style::default()
                .fg(theme.status_color(status.kind))
                .add_modifier(Modifier::BOLD),
        ))
    } else {
        Line::default()
    };
    f.render_widget(Paragraph::new(line), area);
}
