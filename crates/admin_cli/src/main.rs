use std::{error::Error, io::Write, path::PathBuf};

use clap::{Args, Parser, Subcommand};
use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent, KeyModifiers},
    execute,
    style::Print,
    terminal,
    terminal::ClearType,
};
use engine::{CellAssignment, Engine, TableColumn, TableData};
use migration::MigratorTrait;
use sea_orm::{Database, DatabaseConnection};

type CliResult<T> = Result<T, Box<dyn Error + Send + Sync>>;

#[derive(Parser, Debug)]
#[command(name = "ballotbox_admin")]
#[command(about = "Maintenance utilities for the ballotbox database")]
struct Cli {
    /// Database connection string (also read from `DATABASE_URL`).
    #[arg(
        long,
        env = "DATABASE_URL",
        default_value = "sqlite:./instance/app.db?mode=rwc"
    )]
    database_url: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Manage administrator accounts.
    Admin(Admin),
    /// Inspect registered voters.
    Voter(Voter),
    /// Raw access to any table.
    Table(Table),
}

#[derive(Args, Debug)]
struct Admin {
    #[command(subcommand)]
    command: AdminCommand,
}

#[derive(Subcommand, Debug)]
enum AdminCommand {
    /// Create an administrator; the password is prompted twice.
    Create(AdminCreateArgs),
}

#[derive(Args, Debug)]
struct AdminCreateArgs {
    #[arg(long)]
    username: String,
}

#[derive(Args, Debug)]
struct Voter {
    #[command(subcommand)]
    command: VoterCommand,
}

#[derive(Subcommand, Debug)]
enum VoterCommand {
    List,
}

#[derive(Args, Debug)]
struct Table {
    #[command(subcommand)]
    command: TableCommand,
}

#[derive(Subcommand, Debug)]
enum TableCommand {
    /// List user tables.
    List,
    /// Print every row of a table.
    Show { table: String },
    /// Insert a row from `column=value` pairs (`column=` writes NULL).
    Insert {
        table: String,
        #[arg(value_parser = parse_assignment)]
        values: Vec<CellAssignment>,
    },
    /// Update the row whose key column equals `--key`.
    Update {
        table: String,
        #[command(flatten)]
        key: RowKey,
        #[arg(value_parser = parse_assignment, required = true)]
        values: Vec<CellAssignment>,
    },
    /// Delete the row whose key column equals `--key`.
    Delete {
        table: String,
        #[command(flatten)]
        key: RowKey,
    },
    /// Write a table as CSV.
    Export {
        table: String,
        /// Output file; stdout when omitted.
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

#[derive(Args, Debug)]
struct RowKey {
    /// Value of the key column identifying the row.
    #[arg(long)]
    key: String,
    /// Key column; defaults to the primary key, or the first column.
    #[arg(long)]
    key_column: Option<String>,
}

/// Parse `column=value`; an empty value means NULL.
fn parse_assignment(raw: &str) -> Result<CellAssignment, String> {
    let (column, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected column=value, got {raw:?}"))?;
    let column = column.trim();
    if column.is_empty() {
        return Err(format!("missing column name in {raw:?}"));
    }
    let value = (!value.is_empty()).then(|| value.to_string());
    Ok((column.to_string(), value))
}

fn key_column(columns: &[TableColumn], requested: Option<String>) -> CliResult<String> {
    if let Some(column) = requested {
        return Ok(column);
    }
    TableColumn::key_of(columns)
        .map(|idx| columns[idx].name.clone())
        .ok_or_else(|| "table has no columns".into())
}

fn print_table(data: &TableData) {
    let cell = |value: &Option<String>| value.clone().unwrap_or_else(|| "NULL".to_string());
    let mut widths: Vec<usize> = data.columns.iter().map(|c| c.name.len()).collect();
    for row in &data.rows {
        for (idx, value) in row.iter().enumerate() {
            widths[idx] = widths[idx].max(cell(value).chars().count());
        }
    }

    let header: Vec<String> = data
        .columns
        .iter()
        .zip(&widths)
        .map(|(c, w)| format!("{:<w$}", c.name, w = *w))
        .collect();
    println!("{}", header.join("  "));
    for row in &data.rows {
        let line: Vec<String> = row
            .iter()
            .zip(&widths)
            .map(|(v, w)| format!("{:<w$}", cell(v), w = *w))
            .collect();
        println!("{}", line.join("  "));
    }
    println!("({} rows)", data.rows.len());
}

fn write_csv<W: Write>(data: &TableData, out: W) -> CliResult<()> {
    let mut writer = csv::Writer::from_writer(out);
    writer.write_record(data.columns.iter().map(|c| c.name.as_str()))?;
    for row in &data.rows {
        writer.write_record(row.iter().map(|v| v.as_deref().unwrap_or("")))?;
    }
    writer.flush()?;
    Ok(())
}

struct RawModeGuard;

impl RawModeGuard {
    fn enter() -> CliResult<Self> {
        terminal::enable_raw_mode()?;
        Ok(Self)
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
    }
}

fn prompt_password(prompt: &str) -> CliResult<String> {
    let _raw = RawModeGuard::enter()?;

    let mut out = std::io::stderr();
    execute!(
        out,
        cursor::MoveToColumn(0),
        terminal::Clear(ClearType::CurrentLine),
        Print(prompt)
    )?;
    out.flush()?;

    let mut buf = String::new();
    loop {
        let Event::Key(KeyEvent {
            code, modifiers, ..
        }) = event::read()?
        else {
            continue;
        };

        match code {
            KeyCode::Enter => {
                execute!(out, Print("\r\n"))?;
                out.flush()?;
                break;
            }
            KeyCode::Backspace => {
                if buf.pop().is_some() {
                    execute!(out, cursor::MoveLeft(1), Print(" "), cursor::MoveLeft(1))?;
                    out.flush()?;
                }
            }
            KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => {
                execute!(out, Print("\r\n"))?;
                out.flush()?;
                return Err("interrupted".into());
            }
            KeyCode::Char(ch) if !modifiers.contains(KeyModifiers::CONTROL) => {
                buf.push(ch);
                execute!(out, Print("*"))?;
                out.flush()?;
            }
            _ => {}
        }
    }

    Ok(buf)
}

fn prompt_password_twice() -> CliResult<String> {
    let mut out = std::io::stderr();
    for _ in 0..3 {
        let p1 = prompt_password("Password: ")?;
        if p1.is_empty() {
            execute!(
                out,
                cursor::MoveToColumn(0),
                terminal::Clear(ClearType::CurrentLine),
                Print("Password must not be empty.\r\n")
            )?;
            continue;
        }

        let p2 = prompt_password("Confirm password: ")?;
        if p1 == p2 {
            return Ok(p1);
        }

        execute!(
            out,
            cursor::MoveToColumn(0),
            terminal::Clear(ClearType::CurrentLine),
            Print("Passwords do not match. Try again.\r\n")
        )?;
    }

    Err("too many attempts".into())
}

async fn connect_db(database_url: &str) -> CliResult<DatabaseConnection> {
    let db = Database::connect(database_url).await?;
    migration::Migrator::up(&db, None).await?;
    Ok(db)
}

#[tokio::main]
async fn main() -> CliResult<()> {
    let cli = Cli::parse();

    let db = connect_db(&cli.database_url).await?;
    let engine = Engine::builder().database(db).build().await?;

    match cli.command {
        Command::Admin(Admin {
            command: AdminCommand::Create(args),
        }) => {
            let password = prompt_password_twice()?;
            let admin = engine.create_admin(&args.username, &password).await?;
            println!("created admin: {} (id {})", admin.username, admin.id);
        }
        Command::Voter(Voter {
            command: VoterCommand::List,
        }) => {
            for voter in engine.list_voters().await? {
                println!(
                    "{}\t{}\t{}\t{}",
                    voter.id,
                    voter.school_id,
                    voter.full_name,
                    voter.grade.as_deref().unwrap_or("")
                );
            }
        }
        Command::Table(Table { command }) => match command {
            TableCommand::List => {
                for table in engine.list_tables().await? {
                    println!("{table}");
                }
            }
            TableCommand::Show { table } => {
                print_table(&engine.table_rows(&table).await?);
            }
            TableCommand::Insert { table, values } => {
                let inserted = engine.insert_row(&table, &values).await?;
                println!("inserted {inserted} row(s) into {table}");
            }
            TableCommand::Update { table, key, values } => {
                let columns = engine.table_columns(&table).await?;
                let column = key_column(&columns, key.key_column)?;
                let updated = engine
                    .update_row(&table, &column, &key.key, &values)
                    .await?;
                if updated == 0 {
                    eprintln!("no row in {table} with {column} = {}", key.key);
                    std::process::exit(1);
                }
                println!("updated {updated} row(s) in {table}");
            }
            TableCommand::Delete { table, key } => {
                let columns = engine.table_columns(&table).await?;
                let column = key_column(&columns, key.key_column)?;
                let deleted = engine.delete_row(&table, &column, &key.key).await?;
                if deleted == 0 {
                    eprintln!("no row in {table} with {column} = {}", key.key);
                    std::process::exit(1);
                }
                println!("deleted {deleted} row(s) from {table}");
            }
            TableCommand::Export { table, out } => {
                let data = engine.table_rows(&table).await?;
                match out {
                    Some(path) => {
                        write_csv(&data, std::fs::File::create(&path)?)?;
                        eprintln!("wrote {} rows to {}", data.rows.len(), path.display());
                    }
                    None => write_csv(&data, std::io::stdout().lock())?,
                }
            }
        },
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn column(name: &str, primary_key: bool) -> TableColumn {
        TableColumn {
            name: name.to_string(),
            declared_type: "text".to_string(),
            not_null: false,
            primary_key,
        }
    }

    #[test]
    fn assignments_parse() {
        assert_eq!(
            parse_assignment("title=President").unwrap(),
            ("title".to_string(), Some("President".to_string()))
        );
        assert_eq!(
            parse_assignment("bio=").unwrap(),
            ("bio".to_string(), None)
        );
        assert_eq!(
            parse_assignment("note=a=b").unwrap(),
            ("note".to_string(), Some("a=b".to_string()))
        );
        assert!(parse_assignment("title").is_err());
        assert!(parse_assignment("=x").is_err());
    }

    #[test]
    fn key_column_defaults_to_primary_key() {
        let columns = vec![column("name", false), column("token", true)];
        assert_eq!(key_column(&columns, None).unwrap(), "token");
        assert_eq!(
            key_column(&columns, Some("name".to_string())).unwrap(),
            "name"
        );
        assert!(key_column(&[], None).is_err());
    }

    #[test]
    fn csv_writes_null_as_empty() {
        let data = TableData {
            table: "positions".to_string(),
            columns: vec![column("id", true), column("title", false)],
            rows: vec![
                vec![Some("1".to_string()), Some("Chair, Board".to_string())],
                vec![Some("2".to_string()), None],
            ],
        };
        let mut out = Vec::new();
        write_csv(&data, &mut out).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "id,title\n1,\"Chair, Board\"\n2,\n"
        );
    }
}
