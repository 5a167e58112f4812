use chrono::Duration;
use sea_orm::DatabaseConnection;

use crate::{ResultEngine, password::PasswordHasher};

mod admins;
mod ballots;
mod candidates;
mod dashboard;
mod elections;
mod positions;
mod sessions;
mod tables;
mod voters;

pub use dashboard::Dashboard;

/// Run a block inside a DB transaction, committing on success and rolling back on error.
macro_rules! with_tx {
    ($self:expr, |$tx:ident| $body:expr) => {{
        let $tx = $self.database.begin().await?;
        let result = $body;
        match result {
            Ok(value) => {
                $tx.commit().await?;
                Ok(value)
            }
            Err(err) => Err(err),
        }
    }};
}

pub(crate) use with_tx;

/// Default lifetime of a login session.
const DEFAULT_SESSION_TTL_MINUTES: i64 = 12 * 60;

#[derive(Debug)]
pub struct Engine {
    database: DatabaseConnection,
    passwords: PasswordHasher,
    session_ttl: Duration,
}

impl Engine {
    /// Return a builder for `Engine`. Help to build the struct.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }

    /// Lifetime given to sessions opened by this engine.
    pub fn session_ttl(&self) -> Duration {
        self.session_ttl
    }
}

/// The builder for `Engine`
pub struct EngineBuilder {
    database: DatabaseConnection,
    password_cost: u32,
    session_ttl: Duration,
}

impl Default for EngineBuilder {
    fn default() -> Self {
        Self {
            database: DatabaseConnection::default(),
            password_cost: bcrypt::DEFAULT_COST,
            session_ttl: Duration::minutes(DEFAULT_SESSION_TTL_MINUTES),
        }
    }
}

impl EngineBuilder {
    /// Pass the required database
    pub fn database(mut self, db: DatabaseConnection) -> EngineBuilder {
        self.database = db;
        self
    }

    /// bcrypt work factor used for new password hashes (4..=31).
    pub fn password_cost(mut self, cost: u32) -> EngineBuilder {
        self.password_cost = cost;
        self
    }

    /// How long a login session stays valid.
    pub fn session_ttl(mut self, ttl: Duration) -> EngineBuilder {
        self.session_ttl = ttl;
        self
    }

    /// Construct `Engine`
    pub async fn build(self) -> ResultEngine<Engine> {
        Ok(Engine {
            database: self.database,
            passwords: PasswordHasher::new(self.password_cost)?,
            session_ttl: self.session_ttl,
        })
    }
}
