pub mod components;
pub mod keymap;

mod terminal;
mod theme;

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::Paragraph,
};

use crate::app::{AppState, Mode};

pub use terminal::TerminalGuard;
pub use theme::Theme;

pub fn render(frame: &mut Frame<'_>, state: &AppState) {
    let theme = Theme::default();
    let area = frame.area();

    // Tab bar, grid, bottom bar
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(area);

    components::tabs::render_tabs(frame, layout[0], &state.tables, state.active, &theme);
    match &state.data {
        Some(data) => {
            components::grid::render(frame, layout[1], data, state.selected, &theme)
        }
        None => render_empty(frame, layout[1], &theme),
    }
    render_bottom_bar(frame, layout[2], state, &theme);

    match &state.mode {
        Mode::Browse => {}
        Mode::Form(form) => {
            let table = state.active_table().unwrap_or_default();
            components::form::render(frame, area, table, form, &theme);
        }
        Mode::ConfirmDelete {
            key_column,
            key_value,
        } => {
            let table = state.active_table().unwrap_or_default();
            components::confirm::render(frame, area, table, key_column, key_value, &theme);
        }
    }
    components::toast::render(frame, area, state.toast.as_ref(), &theme);
}

fn render_empty(frame: &mut Frame<'_>, area: Rect, theme: &Theme) {
    let text = Paragraph::new(Line::from(Span::styled(
        "No tables found.",
        Style::default().fg(theme.dim),
    )));
    frame.render_widget(text, area);
}

fn render_bottom_bar(frame: &mut Frame<'_>, area: Rect, state: &AppState, theme: &Theme) {
    use components::hints::{KeyHint, hints_to_spans};

    let hints = match &state.mode {
        Mode::Browse => vec![
            KeyHint::new("←→", "table"),
            KeyHint::new("↑↓", "row"),
            KeyHint::new("a", "add"),
            KeyHint::new("e", "edit"),
            KeyHint::new("d", "delete"),
            KeyHint::new("r", "reload"),
            KeyHint::new("q", "quit"),
        ],
        Mode::Form(form) => {
            let submit = if form.can_submit() { "save" } else { "no changes" };
            vec![
                KeyHint::new("Tab", "next field"),
                KeyHint::new("Enter", submit),
                KeyHint::new("Esc", "cancel"),
            ]
        }
        Mode::ConfirmDelete { .. } => vec![
            KeyHint::new("y", "delete"),
            KeyHint::new("n", "keep"),
        ],
    };

    let bar = Paragraph::new(Line::from(hints_to_spans(&hints, theme)));
    frame.render_widget(bar, area);
}

/// Rectangle of at most `width` x `height` centered in `area`.
pub(crate) fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}
