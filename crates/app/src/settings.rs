use config::{Config, ConfigError, Environment, File, builder::DefaultState};
use serde::Deserialize;

const DEFAULT_SETTINGS_PATH: &str = "settings";
const ENV_PREFIX: &str = "BALLOTBOX";
/// Cookie signing keys are derived from the secret; shorter input is refused.
pub const MIN_SECRET_KEY_BYTES: usize = 32;

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub app: App,
    #[serde(default)]
    pub server: Server,
    /// Administrator created on start when none exists yet.
    pub bootstrap_admin: Option<BootstrapAdmin>,
}

#[derive(Debug, Deserialize)]
pub struct App {
    #[serde(default = "default_level")]
    pub level: String,
    pub secret_key: String,
}

#[derive(Debug, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Database {
    Memory,
    Sqlite(String),
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Server {
    pub bind: Option<String>,
    pub port: u16,
    pub database: Database,
    pub uploads_dir: String,
    pub session_ttl_minutes: i64,
    pub max_upload_bytes: usize,
    pub secure_cookies: bool,
}

impl Default for Server {
    fn default() -> Self {
        Self {
            bind: None,
            port: 5000,
            database: Database::Sqlite("./instance/app.db".to_string()),
            uploads_dir: "static/uploads".to_string(),
            session_ttl_minutes: 12 * 60,
            max_upload_bytes: server::DEFAULT_MAX_UPLOAD_BYTES,
            secure_cookies: false,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct BootstrapAdmin {
    pub username: String,
    pub password: String,
}

fn default_level() -> String {
    "info".to_string()
}

impl Settings {
    /// Read `settings.toml` (optional) and `BALLOTBOX__SECTION__KEY`
    /// environment overrides.
    pub fn new() -> Result<Self, ConfigError> {
        Self::from_builder(
            Config::builder()
                .add_source(File::with_name(DEFAULT_SETTINGS_PATH).required(false))
                .add_source(Environment::with_prefix(ENV_PREFIX).separator("__")),
        )
    }

    fn from_builder(builder: config::ConfigBuilder<DefaultState>) -> Result<Self, ConfigError> {
        let settings: Settings = builder.build()?.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.app.secret_key.len() < MIN_SECRET_KEY_BYTES {
            return Err(ConfigError::Message(format!(
                "app.secret_key must be at least {MIN_SECRET_KEY_BYTES} bytes"
            )));
        }
        if self.server.session_ttl_minutes <= 0 {
            return Err(ConfigError::Message(
                "server.session_ttl_minutes must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::FileFormat;

    fn parse(toml: &str) -> Result<Settings, ConfigError> {
        Settings::from_builder(Config::builder().add_source(File::from_str(toml, FileFormat::Toml)))
    }

    const SECRET: &str = "0123456789abcdef0123456789abcdef";

    #[test]
    fn defaults_fill_missing_server_section() {
        let settings = parse(&format!("[app]\nsecret_key = \"{SECRET}\"\n")).unwrap();
        assert_eq!(settings.app.level, "info");
        assert_eq!(settings.server.port, 5000);
        assert_eq!(
            settings.server.database,
            Database::Sqlite("./instance/app.db".to_string())
        );
        assert!(settings.bootstrap_admin.is_none());
    }

    #[test]
    fn reads_every_section() {
        let settings = parse(&format!(
            r#"
[app]
level = "debug"
secret_key = "{SECRET}"

[server]
bind = "0.0.0.0"
port = 8080
database = "memory"
uploads_dir = "/var/ballotbox"
session_ttl_minutes = 30

[bootstrap_admin]
username = "root"
password = "change-me"
"#
        ))
        .unwrap();
        assert_eq!(settings.server.database, Database::Memory);
        assert_eq!(settings.server.bind.as_deref(), Some("0.0.0.0"));
        assert_eq!(settings.server.session_ttl_minutes, 30);
        assert_eq!(
            settings.bootstrap_admin.map(|a| a.username).as_deref(),
            Some("root")
        );
    }

    #[test]
    fn sqlite_path_table() {
        let settings = parse(&format!(
            "[app]\nsecret_key = \"{SECRET}\"\n[server]\ndatabase = {{ sqlite = \"votes.db\" }}\n"
        ))
        .unwrap();
        assert_eq!(
            settings.server.database,
            Database::Sqlite("votes.db".to_string())
        );
    }

    #[test]
    fn short_or_missing_secret_is_rejected() {
        assert!(parse("[app]\nsecret_key = \"short\"\n").is_err());
        assert!(parse("[app]\nlevel = \"info\"\n").is_err());
    }
}
