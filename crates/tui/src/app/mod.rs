use std::time::{Duration, Instant};

use crossterm::event::{self, Event, KeyEventKind};
use engine::{CellAssignment, Engine, TableData};

use crate::{
    error::{AppError, Result},
    ui::{
        self,
        keymap::{AppAction, map_key},
    },
};

const TOAST_TTL: Duration = Duration::from_secs(3);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastLevel {
    Success,
    Error,
}

#[derive(Debug, Clone)]
pub struct ToastState {
    pub level: ToastLevel,
    pub message: String,
    shown_at: Instant,
}

impl ToastState {
    fn success(message: impl Into<String>) -> Self {
        Self {
            level: ToastLevel::Success,
            message: message.into(),
            shown_at: Instant::now(),
        }
    }

    fn error(message: impl Into<String>) -> Self {
        Self {
            level: ToastLevel::Error,
            message: message.into(),
            shown_at: Instant::now(),
        }
    }

    fn expired(&self, now: Instant) -> bool {
        now.duration_since(self.shown_at) >= TOAST_TTL
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormKind {
    Add,
    Edit { key_column: String, key_value: String },
}

#[derive(Debug, Clone)]
pub struct FormField {
    pub column: String,
    pub declared_type: String,
    pub value: String,
    original: String,
}

impl FormField {
    pub fn changed(&self) -> bool {
        self.value != self.original
    }

    fn assignment(&self) -> CellAssignment {
        let value = if self.value.is_empty() {
            None
        } else {
            Some(self.value.clone())
        };
        (self.column.clone(), value)
    }
}

/// Row editor shown on top of the grid.
#[derive(Debug, Clone)]
pub struct FormState {
    pub kind: FormKind,
    pub fields: Vec<FormField>,
    pub focus: usize,
}

impl FormState {
    /// Empty form for a new row. An integer primary key is left to SQLite.
    pub fn for_insert(data: &TableData) -> Self {
        let fields = data
            .columns
            .iter()
            .filter(|column| !column.is_rowid_alias())
            .map(|column| FormField {
                column: column.name.clone(),
                declared_type: column.declared_type.clone(),
                value: String::new(),
                original: String::new(),
            })
            .collect();
        Self {
            kind: FormKind::Add,
            fields,
            focus: 0,
        }
    }

    /// Form prefilled with `row`. `None` when the row has no usable key.
    pub fn for_update(data: &TableData, row: usize) -> Option<Self> {
        let cells = data.rows.get(row)?;
        let key_index = data.key_index()?;
        let key_value = cells.get(key_index)?.clone()?;
        let key_column = data.columns.get(key_index)?.name.clone();

        let fields = data
            .columns
            .iter()
            .zip(cells)
            .map(|(column, cell)| {
                let text = cell.clone().unwrap_or_default();
                FormField {
                    column: column.name.clone(),
                    declared_type: column.declared_type.clone(),
                    value: text.clone(),
                    original: text,
                }
            })
            .collect();
        Some(Self {
            kind: FormKind::Edit {
                key_column,
                key_value,
            },
            fields,
            focus: 0,
        })
    }

    pub fn is_dirty(&self) -> bool {
        self.fields.iter().any(FormField::changed)
    }

    pub fn can_submit(&self) -> bool {
        match self.kind {
            FormKind::Add => true,
            FormKind::Edit { .. } => self.is_dirty(),
        }
    }

    /// Values to write. Blank fields become NULL; an edit only writes what changed.
    pub fn assignments(&self) -> Vec<CellAssignment> {
        self.fields
            .iter()
            .filter(|field| matches!(self.kind, FormKind::Add) || field.changed())
            .map(FormField::assignment)
            .collect()
    }

    fn next_field(&mut self) {
        if !self.fields.is_empty() {
            self.focus = (self.focus + 1) % self.fields.len();
        }
    }

    fn prev_field(&mut self) {
        if !self.fields.is_empty() {
            self.focus = (self.focus + self.fields.len() - 1) % self.fields.len();
        }
    }

    fn push_char(&mut self, ch: char) {
        if let Some(field) = self.fields.get_mut(self.focus) {
            field.value.push(ch);
        }
    }

    fn backspace(&mut self) {
        if let Some(field) = self.fields.get_mut(self.focus) {
            field.value.pop();
        }
    }
}

#[derive(Debug, Clone)]
pub enum Mode {
    Browse,
    Form(FormState),
    ConfirmDelete {
        key_column: String,
        key_value: String,
    },
}

#[derive(Debug)]
pub struct AppState {
    pub tables: Vec<String>,
    pub active: usize,
    pub data: Option<TableData>,
    pub selected: usize,
    pub mode: Mode,
    pub toast: Option<ToastState>,
}

impl AppState {
    fn new() -> Self {
        Self {
            tables: Vec::new(),
            active: 0,
            data: None,
            selected: 0,
            mode: Mode::Browse,
            toast: None,
        }
    }

    pub fn active_table(&self) -> Option<&str> {
        self.tables.get(self.active).map(String::as_str)
    }

    fn row_count(&self) -> usize {
        self.data.as_ref().map_or(0, |data| data.rows.len())
    }

    fn select_next(&mut self) {
        let rows = self.row_count();
        if rows > 0 {
            self.selected = (self.selected + 1).min(rows - 1);
        }
    }

    fn select_prev(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    fn clamp_selection(&mut self) {
        self.selected = self.selected.min(self.row_count().saturating_sub(1));
    }

    /// Moves the active tab by `step`, wrapping around. Returns whether it changed.
    fn switch_table(&mut self, step: isize) -> bool {
        let count = self.tables.len();
        if count < 2 {
            return false;
        }
        let next = (self.active as isize + step).rem_euclid(count as isize) as usize;
        self.active = next;
        self.selected = 0;
        true
    }

    fn delete_target(&self) -> Option<(String, String)> {
        let data = self.data.as_ref()?;
        let key_index = data.key_index()?;
        let key_value = data.rows.get(self.selected)?.get(key_index)?.clone()?;
        Some((data.columns.get(key_index)?.name.clone(), key_value))
    }

    fn expire_toast(&mut self, now: Instant) {
        if self.toast.as_ref().is_some_and(|toast| toast.expired(now)) {
            self.toast = None;
        }
    }
}

pub struct App {
    engine: Engine,
    pub state: AppState,
    should_quit: bool,
}

impl App {
    pub fn new(engine: Engine) -> Self {
        Self {
            engine,
            state: AppState::new(),
            should_quit: false,
        }
    }

    pub async fn run(&mut self) -> Result<()> {
        self.reload_tables().await?;
        let mut terminal = ui::TerminalGuard::enter()?;
        self.event_loop(&mut terminal).await
    }

    async fn event_loop(&mut self, terminal: &mut ui::TerminalGuard) -> Result<()> {
        let tick_rate = Duration::from_millis(200);

        while !self.should_quit {
            terminal
                .draw(|frame| ui::render(frame, &self.state))
                .map_err(|err| AppError::Terminal(err.to_string()))?;

            if event::poll(tick_rate)?
                && let Event::Key(key) = event::read()?
                && key.kind == KeyEventKind::Press
            {
                self.handle_action(map_key(key)).await;
            }
            self.state.expire_toast(Instant::now());
        }

        Ok(())
    }

    async fn handle_action(&mut self, action: AppAction) {
        if action == AppAction::Quit {
            self.should_quit = true;
            return;
        }

        match &mut self.state.mode {
            Mode::Browse => self.handle_browse(action).await,
            Mode::Form(form) => match action {
                AppAction::Cancel => self.state.mode = Mode::Browse,
                AppAction::NextField | AppAction::Down => form.next_field(),
                AppAction::PrevField | AppAction::Up => form.prev_field(),
                AppAction::Backspace => form.backspace(),
                AppAction::Input(ch) => form.push_char(ch),
                AppAction::Submit => self.submit_form().await,
                _ => {}
            },
            Mode::ConfirmDelete { .. } => match action {
                AppAction::Input('y') | AppAction::Submit => self.confirm_delete().await,
                AppAction::Input('n') | AppAction::Cancel => self.state.mode = Mode::Browse,
                _ => {}
            },
        }
    }

    async fn handle_browse(&mut self, action: AppAction) {
        match action {
            AppAction::Input('q') => self.should_quit = true,
            AppAction::Left | AppAction::Right => {
                let step = if action == AppAction::Left { -1 } else { 1 };
                if self.state.switch_table(step) {
                    self.reload_rows().await;
                }
            }
            AppAction::Up => self.state.select_prev(),
            AppAction::Down => self.state.select_next(),
            AppAction::Input('r') => {
                if let Err(err) = self.reload_tables().await {
                    self.state.toast = Some(ToastState::error(err.to_string()));
                } else {
                    self.state.toast = Some(ToastState::success("Reloaded."));
                }
            }
            AppAction::Input('a') => {
                if let Some(data) = &self.state.data {
                    self.state.mode = Mode::Form(FormState::for_insert(data));
                }
            }
            AppAction::Input('e') => {
                let form = self
                    .state
                    .data
                    .as_ref()
                    .and_then(|data| FormState::for_update(data, self.state.selected));
                match form {
                    Some(form) => self.state.mode = Mode::Form(form),
                    None => {
                        if self.state.row_count() > 0 {
                            self.state.toast =
                                Some(ToastState::error("Selected row has no key value."));
                        }
                    }
                }
            }
            AppAction::Input('d') => match self.state.delete_target() {
                Some((key_column, key_value)) => {
                    self.state.mode = Mode::ConfirmDelete {
                        key_column,
                        key_value,
                    };
                }
                None => {
                    if self.state.row_count() > 0 {
                        self.state.toast =
                            Some(ToastState::error("Selected row has no key value."));
                    }
                }
            },
            _ => {}
        }
    }

    async fn submit_form(&mut self) {
        let Mode::Form(form) = &self.state.mode else {
            return;
        };
        if !form.can_submit() {
            return;
        }
        let Some(table) = self.state.active_table().map(str::to_string) else {
            return;
        };

        let values = form.assignments();
        let result = match &form.kind {
            FormKind::Add => self
                .engine
                .insert_row(&table, &values)
                .await
                .map(|_| format!("Row added to {table}.")),
            FormKind::Edit {
                key_column,
                key_value,
            } => self
                .engine
                .update_row(&table, key_column, key_value, &values)
                .await
                .map(|count| format!("{count} row(s) updated in {table}.")),
        };

        match result {
            Ok(message) => {
                self.state.mode = Mode::Browse;
                self.state.toast = Some(ToastState::success(message));
                self.reload_rows().await;
            }
            // Keep the form open so the input can be corrected.
            Err(err) => self.state.toast = Some(ToastState::error(err.to_string())),
        }
    }

    async fn confirm_delete(&mut self) {
        let Mode::ConfirmDelete {
            key_column,
            key_value,
        } = std::mem::replace(&mut self.state.mode, Mode::Browse)
        else {
            return;
        };
        let Some(table) = self.state.active_table().map(str::to_string) else {
            return;
        };

        match self.engine.delete_row(&table, &key_column, &key_value).await {
            Ok(count) => {
                self.state.toast = Some(ToastState::success(format!(
                    "{count} row(s) deleted from {table}."
                )));
                self.reload_rows().await;
            }
            Err(err) => self.state.toast = Some(ToastState::error(err.to_string())),
        }
    }

    async fn reload_tables(&mut self) -> Result<()> {
        let current = self.state.active_table().map(str::to_string);
        self.state.tables = self.engine.list_tables().await?;
        self.state.active = current
            .and_then(|name| self.state.tables.iter().position(|table| *table == name))
            .unwrap_or(0);
        self.state.data = match self.state.active_table() {
            Some(table) => Some(self.engine.table_rows(table).await?),
            None => None,
        };
        self.state.clamp_selection();
        Ok(())
    }

    async fn reload_rows(&mut self) {
        let Some(table) = self.state.active_table().map(str::to_string) else {
            return;
        };
        match self.engine.table_rows(&table).await {
            Ok(data) => {
                self.state.data = Some(data);
                self.state.clamp_selection();
            }
            Err(err) => {
                self.state.data = None;
                self.state.toast = Some(ToastState::error(err.to_string()));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use engine::TableColumn;

    use super::*;

    fn column(name: &str, declared_type: &str, primary_key: bool) -> TableColumn {
        TableColumn {
            name: name.to_string(),
            declared_type: declared_type.to_string(),
            not_null: primary_key,
            primary_key,
        }
    }

    fn positions() -> TableData {
        TableData {
            table: "positions".to_string(),
            columns: vec![
                column("id", "INTEGER", true),
                column("title", "TEXT", false),
                column("description", "TEXT", false),
            ],
            rows: vec![
                vec![
                    Some("1".to_string()),
                    Some("President".to_string()),
                    None,
                ],
                vec![
                    Some("2".to_string()),
                    Some("Treasurer".to_string()),
                    Some("Books".to_string()),
                ],
            ],
        }
    }

    #[test]
    fn insert_form_skips_integer_primary_key() {
        let form = FormState::for_insert(&positions());
        let names: Vec<_> = form.fields.iter().map(|f| f.column.as_str()).collect();
        assert_eq!(names, ["title", "description"]);
        assert!(form.can_submit());
    }

    #[test]
    fn insert_form_writes_blank_fields_as_null() {
        let mut form = FormState::for_insert(&positions());
        for ch in "Auditor".chars() {
            form.push_char(ch);
        }
        assert_eq!(
            form.assignments(),
            vec![
                ("title".to_string(), Some("Auditor".to_string())),
                ("description".to_string(), None),
            ]
        );
    }

    #[test]
    fn edit_form_requires_a_change() {
        let mut form = FormState::for_update(&positions(), 1).unwrap();
        assert_eq!(
            form.kind,
            FormKind::Edit {
                key_column: "id".to_string(),
                key_value: "2".to_string(),
            }
        );
        assert!(!form.can_submit());

        form.next_field();
        form.push_char('!');
        assert!(form.can_submit());
        form.backspace();
        assert!(!form.can_submit());
    }

    #[test]
    fn edit_form_only_writes_changed_fields() {
        let mut form = FormState::for_update(&positions(), 1).unwrap();
        form.focus = 2;
        for _ in 0.."Books".len() {
            form.backspace();
        }
        assert_eq!(form.assignments(), vec![("description".to_string(), None)]);
    }

    #[test]
    fn edit_form_falls_back_to_first_column_without_primary_key() {
        let mut data = positions();
        for column in &mut data.columns {
            column.primary_key = false;
        }
        let form = FormState::for_update(&data, 0).unwrap();
        assert_eq!(
            form.kind,
            FormKind::Edit {
                key_column: "id".to_string(),
                key_value: "1".to_string(),
            }
        );
        assert_eq!(form.fields[2].value, "");
    }

    #[test]
    fn focus_wraps_in_both_directions() {
        let mut form = FormState::for_update(&positions(), 0).unwrap();
        form.prev_field();
        assert_eq!(form.focus, 2);
        form.next_field();
        assert_eq!(form.focus, 0);
    }

    #[test]
    fn table_tabs_wrap_and_reset_selection() {
        let mut state = AppState::new();
        state.tables = vec!["admins".to_string(), "voters".to_string()];
        state.selected = 4;
        assert!(state.switch_table(-1));
        assert_eq!(state.active_table(), Some("voters"));
        assert_eq!(state.selected, 0);
        assert!(state.switch_table(1));
        assert_eq!(state.active_table(), Some("admins"));
    }

    #[test]
    fn selection_stays_inside_the_grid() {
        let mut state = AppState::new();
        state.data = Some(positions());
        state.select_next();
        state.select_next();
        assert_eq!(state.selected, 1);
        state.select_prev();
        state.select_prev();
        assert_eq!(state.selected, 0);
    }

    #[test]
    fn delete_target_uses_the_key_column() {
        let mut state = AppState::new();
        state.data = Some(positions());
        state.selected = 1;
        assert_eq!(
            state.delete_target(),
            Some(("id".to_string(), "2".to_string()))
        );
    }
}
