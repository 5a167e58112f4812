use clap::Parser;
use serde::Deserialize;

use crate::error::Result;

const DEFAULT_CONFIG_PATH: &str = "config/tui.toml";
const DEFAULT_DATABASE_URL: &str = "sqlite:./instance/app.db?mode=rwc";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub database_url: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_url: DEFAULT_DATABASE_URL.to_string(),
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "ballotbox_tui", about = "Raw table editor for the voting portal database")]
struct Args {
    /// Optional config file path (TOML).
    #[arg(long)]
    config: Option<String>,
    /// Override the database URL.
    #[arg(long, env = "DATABASE_URL")]
    database_url: Option<String>,
}

pub fn load() -> Result<AppConfig> {
    let args = Args::parse();

    let config_path = args.config.as_deref().unwrap_or(DEFAULT_CONFIG_PATH);
    let mut settings = from_sources(config_path)?;

    if let Some(database_url) = args.database_url {
        settings.database_url = database_url;
    }

    Ok(settings)
}

fn from_sources(config_path: &str) -> Result<AppConfig> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name(config_path).required(false))
        .add_source(config::Environment::with_prefix("BALLOTBOX_TUI"))
        .build()?
        .try_deserialize()?;
    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let settings = from_sources("config/does-not-exist").unwrap();
        assert_eq!(settings.database_url, DEFAULT_DATABASE_URL);
    }
}
