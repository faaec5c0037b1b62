use ratatui::Frame;
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

use pdfchat_core::MAX_UPLOAD_FILES;

use crate::model::selection::PathPrompt;
use crate::theme::Theme;
use crate::view::centered_rect;

/// Render the file-selection prompt as a centered popup.
pub fn render(f: &mut Frame, prompt: &PathPrompt, theme: &Theme) {
    let area = f.area();
    let width = area.width.saturating_sub(10).clamp(20, 90);
    let popup = centered_rect(width, 5, area);

    let inner_width = width.saturating_sub(3) as usize;
    let count = prompt.input.chars().count();
    let visible: String = prompt
        .input
        .chars()
        .skip(count.saturating_sub(inner_width))
        .collect();

    let lines = vec![
        Line::from(Span::styled(
            format!("Up to {MAX_UPLOAD_FILES} PDFs; paths separated by spaces, or a directory"),
            Style::default().fg(theme.dim),
        )),
        Line::from(""),
        Line::from(Span::styled(visible.clone(), Style::default().fg(theme.text))),
    ];

    let paragraph = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme.active))
            .title(" Select PDF files "),
    );

    f.render_widget(Clear, popup);
    f.render_widget(paragraph, popup);
    f.set_cursor_position((
        popup.x + 1 + visible.chars().count() as u16,
        popup.y + 3,
    ));
}
