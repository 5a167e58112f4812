use sea_orm::{ConnectionTrait, Statement, TransactionTrait, Value};

use crate::{CellAssignment, EngineError, ResultEngine, TableColumn, TableData};

use super::{Engine, with_tx};

impl Engine {
    /// User tables of the database file, by name.
    pub async fn list_tables(&self) -> ResultEngine<Vec<String>> {
        table_names(&self.database).await
    }

    /// Columns of `table` in declaration order.
    pub async fn table_columns(&self, table: &str) -> ResultEngine<Vec<TableColumn>> {
        checked_columns(&self.database, table).await
    }

    /// Every row of `table` in rowid order, values rendered as text.
    pub async fn table_rows(&self, table: &str) -> ResultEngine<TableData> {
        let columns = checked_columns(&self.database, table).await?;
        let select_list = columns
            .iter()
            .map(|c| format!("CAST({} AS TEXT)", quote_ident(&c.name)))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!(
            "SELECT {select_list} FROM {} ORDER BY rowid",
            quote_ident(table)
        );

        let backend = self.database.get_database_backend();
        let rows = self
            .database
            .query_all(Statement::from_string(backend, sql))
            .await?
            .into_iter()
            .map(|row| {
                (0..columns.len())
                    .map(|idx| row.try_get_by_index::<Option<String>>(idx))
                    .collect::<Result<Vec<_>, _>>()
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(TableData {
            table: table.to_string(),
            columns,
            rows,
        })
    }

    /// Insert one row. Columns left out take their default.
    pub async fn insert_row(&self, table: &str, values: &[CellAssignment]) -> ResultEngine<u64> {
        with_tx!(self, |db_tx| {
            let columns = checked_columns(&db_tx, table).await?;
            check_assignments(&columns, values)?;
            let sql = if values.is_empty() {
                format!("INSERT INTO {} DEFAULT VALUES", quote_ident(table))
            } else {
                let names = values
                    .iter()
                    .map(|(name, _)| quote_ident(name))
                    .collect::<Vec<_>>()
                    .join(", ");
                let marks = vec!["?"; values.len()].join(", ");
                format!(
                    "INSERT INTO {} ({names}) VALUES ({marks})",
                    quote_ident(table)
                )
            };
            let result = db_tx
                .execute(Statement::from_sql_and_values(
                    db_tx.get_database_backend(),
                    sql,
                    bind_values(values),
                ))
                .await?;
            Ok(result.rows_affected())
        })
    }

    /// Update the row whose `key_column` equals `key_value`.
    pub async fn update_row(
        &self,
        table: &str,
        key_column: &str,
        key_value: &str,
        values: &[CellAssignment],
    ) -> ResultEngine<u64> {
        if values.is_empty() {
            return Err(EngineError::MissingField("At least one column".to_string()));
        }
        with_tx!(self, |db_tx| {
            let columns = checked_columns(&db_tx, table).await?;
            check_column(&columns, key_column)?;
            check_assignments(&columns, values)?;
            let set_list = values
                .iter()
                .map(|(name, _)| format!("{} = ?", quote_ident(name)))
                .collect::<Vec<_>>()
                .join(", ");
            let sql = format!(
                "UPDATE {} SET {set_list} WHERE {} = ?",
                quote_ident(table),
                quote_ident(key_column)
            );
            let mut params = bind_values(values);
            params.push(key_value.into());
            let result = db_tx
                .execute(Statement::from_sql_and_values(
                    db_tx.get_database_backend(),
                    sql,
                    params,
                ))
                .await?;
            Ok(result.rows_affected())
        })
    }

    /// Delete the row whose `key_column` equals `key_value`.
    pub async fn delete_row(
        &self,
        table: &str,
        key_column: &str,
        key_value: &str,
    ) -> ResultEngine<u64> {
        with_tx!(self, |db_tx| {
            let columns = checked_columns(&db_tx, table).await?;
            check_column(&columns, key_column)?;
            let sql = format!(
                "DELETE FROM {} WHERE {} = ?",
                quote_ident(table),
                quote_ident(key_column)
            );
            let result = db_tx
                .execute(Statement::from_sql_and_values(
                    db_tx.get_database_backend(),
                    sql,
                    [key_value.into()],
                ))
                .await?;
            Ok(result.rows_affected())
        })
    }
}

async fn table_names<C: ConnectionTrait>(db: &C) -> ResultEngine<Vec<String>> {
    let rows = db
        .query_all(Statement::from_string(
            db.get_database_backend(),
            "SELECT name FROM sqlite_master \
             WHERE type = 'table' AND name NOT LIKE 'sqlite\\_%' ESCAPE '\\' \
             ORDER BY name",
        ))
        .await?;
    let names = rows
        .into_iter()
        .map(|row| row.try_get::<String>("", "name"))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(names)
}

/// Columns of a table that must exist in the live schema.
async fn checked_columns<C: ConnectionTrait>(
    db: &C,
    table: &str,
) -> ResultEngine<Vec<TableColumn>> {
    if !table_names(db).await?.iter().any(|name| name == table) {
        return Err(EngineError::UnknownTable(table.to_string()));
    }

    let rows = db
        .query_all(Statement::from_sql_and_values(
            db.get_database_backend(),
            "SELECT name, type, \"notnull\", pk FROM pragma_table_info(?) ORDER BY cid",
            [table.into()],
        ))
        .await?;

    let mut columns = Vec::with_capacity(rows.len());
    for row in rows {
        columns.push(TableColumn {
            name: row.try_get("", "name")?,
            declared_type: row.try_get("", "type")?,
            not_null: row.try_get::<i32>("", "notnull")? != 0,
            primary_key: row.try_get::<i32>("", "pk")? != 0,
        });
    }
    Ok(columns)
}

fn check_column(columns: &[TableColumn], name: &str) -> ResultEngine<()> {
    if columns.iter().any(|c| c.name == name) {
        Ok(())
    } else {
        Err(EngineError::UnknownColumn(name.to_string()))
    }
}

fn check_assignments(columns: &[TableColumn], values: &[CellAssignment]) -> ResultEngine<()> {
    values
        .iter()
        .try_for_each(|(name, _)| check_column(columns, name))
}

fn bind_values(values: &[CellAssignment]) -> Vec<Value> {
    values
        .iter()
        .map(|(_, value)| Value::from(value.clone()))
        .collect()
}

/// Quote an SQL identifier, doubling embedded quotes.
fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identifiers_are_quoted() {
        assert_eq!(quote_ident("voters"), "\"voters\"");
        assert_eq!(quote_ident("we\"ird"), "\"we\"\"ird\"");
    }

    #[test]
    fn unknown_columns_are_rejected() {
        let columns = vec![TableColumn {
            name: "id".to_string(),
            declared_type: "integer".to_string(),
            not_null: true,
            primary_key: true,
        }];
        assert!(check_column(&columns, "id").is_ok());
        assert_eq!(
            check_assignments(&columns, &[("nope".to_string(), None)]),
            Err(EngineError::UnknownColumn("nope".to_string()))
        );
    }
}
