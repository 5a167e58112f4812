use ratatui::{
    Frame,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};

use crate::ui::theme::Theme;

/// Renders one tab per table, the active one bracketed.
pub fn render_tabs(
    frame: &mut Frame<'_>,
    area: Rect,
    tables: &[String],
    active: usize,
    theme: &Theme,
) {
    let mut spans = vec![Span::raw(" ")];

    for (i, table) in tables.iter().enumerate() {
        if i > 0 {
            spans.push(Span::raw("  "));
        }

        if i == active {
            spans.push(Span::styled("[", Style::default().fg(theme.accent)));
            spans.push(Span::styled(
                table.as_str(),
                Style::default()
                    .fg(theme.accent)
                    .add_modifier(Modifier::BOLD),
            ));
            spans.push(Span::styled("]", Style::default().fg(theme.accent)));
        } else {
            spans.push(Span::styled(table.as_str(), Style::default().fg(theme.dim)));
        }
    }

    let block = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(Style::default().fg(theme.border));
    frame.render_widget(Paragraph::new(Line::from(spans)).block(block), area);
}
