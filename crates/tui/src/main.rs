mod app;
mod config;
mod error;
mod ui;

use engine::Engine;
use migration::MigratorTrait;
use sea_orm::Database;

use crate::error::Result;

#[tokio::main]
async fn main() -> Result<()> {
    let config = config::load()?;

    let db = Database::connect(&config.database_url).await?;
    migration::Migrator::up(&db, None).await?;
    let engine = Engine::builder().database(db).build().await?;

    let mut app = app::App::new(engine);
    app.run().await?;
    Ok(())
}
