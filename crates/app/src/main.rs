use std::path::Path;

use migration::{Migrator, MigratorTrait};
use sea_orm::ConnectionTrait;
use settings::Database;

mod settings;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let settings = settings::Settings::new()?;

    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "ballotbox={level},server={level},engine={level},tower_http={level}",
            level = settings.app.level
        ))
        .init();

    let server_settings = settings.server;
    let db = parse_database(&server_settings.database).await?;

    let engine = engine::Engine::builder()
        .database(db)
        .session_ttl(chrono::Duration::minutes(
            server_settings.session_ttl_minutes,
        ))
        .build()
        .await?;

    if let Some(admin) = &settings.bootstrap_admin {
        match engine
            .bootstrap_admin(&admin.username, &admin.password)
            .await?
        {
            Some(created) => tracing::info!("created administrator {}", created.username),
            None => tracing::debug!("administrator already present, bootstrap skipped"),
        }
    }

    let purged = engine.purge_expired_sessions().await?;
    if purged > 0 {
        tracing::info!("removed {purged} expired sessions");
    }

    let config = server::Config {
        key: server::Key::derive_from(settings.app.secret_key.as_bytes()),
        uploads_dir: server_settings.uploads_dir.into(),
        max_upload_bytes: server_settings.max_upload_bytes,
        secure_cookies: server_settings.secure_cookies,
    };

    let bind = server_settings
        .bind
        .unwrap_or_else(|| "127.0.0.1".to_string());
    let addr = format!("{}:{}", bind, server_settings.port);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    server::run_with_listener(engine, config, listener).await?;

    Ok(())
}

async fn parse_database(
    config: &Database,
) -> Result<sea_orm::DatabaseConnection, Box<dyn std::error::Error + Send + Sync>> {
    let url = match config {
        Database::Memory => String::from("sqlite::memory:"),
        Database::Sqlite(path) => {
            if let Some(parent) = Path::new(path).parent()
                && !parent.as_os_str().is_empty()
            {
                tokio::fs::create_dir_all(parent).await?;
            }
            format!("sqlite:{}?mode=rwc", path)
        }
    };

    let database = sea_orm::Database::connect(url).await?;
    if matches!(config, Database::Sqlite(_)) {
        // Lets the maintenance tools read while the server writes.
        database
            .execute_unprepared("PRAGMA journal_mode=WAL;")
            .await?;
    }
    Migrator::up(&database, None).await?;
    tracing::info!("database ready");
    Ok(database)
}
