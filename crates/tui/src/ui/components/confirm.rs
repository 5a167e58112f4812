use ratatui::{
    Frame,
    layout::{Alignment, Rect},
    style::Style,
    text::Line,
    widgets::{Block, Borders, Clear, Paragraph},
};

use crate::ui::{centered, theme::Theme};

pub fn render(
    frame: &mut Frame<'_>,
    area: Rect,
    table: &str,
    key_column: &str,
    key_value: &str,
    theme: &Theme,
) {
    let lines = vec![
        Line::from(format!("Delete the row of {table} where {key_column} = {key_value}?")),
        Line::default(),
        Line::from("y / Enter to delete, n / Esc to keep"),
    ];
    let width = lines.iter().map(Line::width).max().unwrap_or(0) as u16 + 4;
    let rect = centered(area, width, lines.len() as u16 + 2);

    let block = Block::default()
        .title(" Confirm ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.error));
    let content = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .style(Style::default().fg(theme.text))
        .block(block);

    frame.render_widget(Clear, rect);
    frame.render_widget(content, rect);
}
