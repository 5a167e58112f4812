use engine::TableData;
use ratatui::{
    Frame,
    layout::{Constraint, Rect},
    style::{Modifier, Style},
    text::Span,
    widgets::{Cell, Row, Table, TableState},
};

use crate::ui::theme::Theme;

const NULL_LABEL: &str = "NULL";

/// Renders every row of `data`; odd rows are shaded and `selected` highlighted.
pub fn render(
    frame: &mut Frame<'_>,
    area: Rect,
    data: &TableData,
    selected: usize,
    theme: &Theme,
) {
    let header = Row::new(data.columns.iter().map(|column| {
        let label = if column.primary_key {
            format!("{} *", column.name)
        } else {
            column.name.clone()
        };
        Cell::from(label)
    }))
    .style(
        Style::default()
            .fg(theme.accent)
            .bg(theme.header)
            .add_modifier(Modifier::BOLD),
    );

    let rows = data.rows.iter().enumerate().map(|(i, cells)| {
        let row = Row::new(cells.iter().map(|cell| match cell {
            Some(value) => Cell::from(Span::raw(value.as_str())),
            None => Cell::from(Span::styled(NULL_LABEL, Style::default().fg(theme.dim))),
        }));
        if i % 2 == 1 {
            row.style(Style::default().fg(theme.text).bg(theme.zebra))
        } else {
            row.style(Style::default().fg(theme.text))
        }
    });

    let widths = vec![Constraint::Fill(1); data.columns.len().max(1)];
    let table = Table::new(rows, widths)
        .header(header)
        .column_spacing(2)
        .row_highlight_style(
            Style::default()
                .bg(theme.selected)
                .add_modifier(Modifier::BOLD),
        );

    let mut state = TableState::default();
    if !data.rows.is_empty() {
        state.select(Some(selected));
    }
    frame.render_stateful_widget(table, area, &mut state);
}
