use sea_orm_migration::cli;

/// `up`, `down`, `fresh`, `status`, `refresh` and `reset` against
/// `DATABASE_URL` (or `--database-url`).
#[tokio::main]
async fn main() {
    cli::run_cli(migration::Migrator).await;
}
