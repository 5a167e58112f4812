use ratatui::{
    Frame,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
};

use crate::{
    app::{FormKind, FormState},
    ui::{centered, theme::Theme},
};

pub fn render(frame: &mut Frame<'_>, area: Rect, table: &str, form: &FormState, theme: &Theme) {
    let title = match &form.kind {
        FormKind::Add => format!(" Add row to {table} "),
        FormKind::Edit {
            key_column,
            key_value,
        } => format!(" Edit {table} ({key_column} = {key_value}) "),
    };

    let label_width = form
        .fields
        .iter()
        .map(|field| field.column.chars().count())
        .max()
        .unwrap_or(0);

    let mut lines: Vec<Line<'_>> = form
        .fields
        .iter()
        .enumerate()
        .map(|(i, field)| {
            let focused = i == form.focus;
            let label_style = if focused {
                Style::default()
                    .fg(theme.accent)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(theme.dim)
            };
            let marker = if field.changed() { "*" } else { " " };
            let mut spans = vec![
                Span::styled(format!("{:>label_width$} ", field.column), label_style),
                Span::styled(marker, Style::default().fg(theme.accent)),
                Span::raw(" "),
            ];
            if field.value.is_empty() {
                spans.push(Span::styled("NULL", Style::default().fg(theme.dim)));
            } else {
                spans.push(Span::styled(
                    field.value.as_str(),
                    Style::default().fg(theme.text),
                ));
            }
            if focused {
                spans.push(Span::styled("▏", Style::default().fg(theme.accent)));
            }
            if !field.declared_type.is_empty() {
                spans.push(Span::styled(
                    format!("  {}", field.declared_type),
                    Style::default().fg(theme.dim),
                ));
            }
            Line::from(spans)
        })
        .collect();

    lines.push(Line::default());
    let footer = if form.can_submit() {
        Span::styled(
            "Enter to save, blank fields are stored as NULL",
            Style::default().fg(theme.dim),
        )
    } else {
        Span::styled("Nothing changed yet", Style::default().fg(theme.error))
    };
    lines.push(Line::from(footer));

    let height = lines.len() as u16 + 2;
    let rect = centered(area, area.width.saturating_sub(8).max(40), height);
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.accent));

    frame.render_widget(Clear, rect);
    frame.render_widget(Paragraph::new(lines).block(block), rect);
}
