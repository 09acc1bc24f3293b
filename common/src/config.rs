use anyhow::Context;

pub const DEFAULT_MAX_CONNECTIONS: u32 = 10;

/// Connection settings for the PostgreSQL pool, read from `DB_*` variables.
#[derive(Debug, Clone)]
pub struct DbConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub database: String,
    pub max_connections: u32,
}

impl DbConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let host = std::env::var("DB_HOST").context("DB_HOST must be set")?;

        let port = std::env::var("DB_PORT")
            .context("DB_PORT must be set")?
            .parse::<u16>()
            .context("DB_PORT must be a valid port number")?;

        let user = std::env::var("DB_USER").context("DB_USER must be set")?;

        let password = std::env::var("DB_PASSWORD").context("DB_PASSWORD must be set")?;

        let database = std::env::var("DB_NAME").context("DB_NAME must be set")?;

        let max_connections = match std::env::var("DB_MAX_CONNECTIONS") {
            Ok(value) => value
                .parse::<u32>()
                .context("DB_MAX_CONNECTIONS must be a positive integer")?,
            Err(_) => DEFAULT_MAX_CONNECTIONS,
        };

        Ok(Self {
            host,
            port,
            user,
            password,
            database,
            max_connections,
        })
    }
}
