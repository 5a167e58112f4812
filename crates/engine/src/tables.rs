//! Raw table access for maintenance tools.
//!
//! These types describe tables by their live SQLite schema rather than by the
//! entities above, so the tools keep working on any table in the file.

/// One column as reported by `pragma_table_info`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TableColumn {
    pub name: String,
    /// Declared SQL type; empty when the column was declared without one.
    pub declared_type: String,
    pub not_null: bool,
    pub primary_key: bool,
}

impl TableColumn {
    /// SQLite assigns `INTEGER PRIMARY KEY` values itself when omitted.
    pub fn is_rowid_alias(&self) -> bool {
        self.primary_key && self.declared_type.eq_ignore_ascii_case("integer")
    }

    /// Column used to address single rows: the declared primary key, or the
    /// first column when the table has none.
    pub fn key_of(columns: &[TableColumn]) -> Option<usize> {
        columns
            .iter()
            .position(|c| c.primary_key)
            .or_else(|| (!columns.is_empty()).then_some(0))
    }
}

/// Every row of a table, every value rendered as text.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TableData {
    pub table: String,
    pub columns: Vec<TableColumn>,
    pub rows: Vec<Vec<Option<String>>>,
}

impl TableData {
    /// See [`TableColumn::key_of`].
    pub fn key_column(&self) -> Option<&TableColumn> {
        self.key_index().map(|idx| &self.columns[idx])
    }

    pub fn key_index(&self) -> Option<usize> {
        TableColumn::key_of(&self.columns)
    }
}

/// A `(column, value)` pair to write; `None` writes SQL `NULL`.
pub type CellAssignment = (String, Option<String>);
