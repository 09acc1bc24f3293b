use std::sync::Arc;

use anyhow::Context;
use chrono_tz::Tz;
use common::{Database, DbConfig};

use crate::state::AppState;

pub struct AppConfig {
    pub db: DbConfig,
    pub bind_address: String,
    pub port: u16,
    pub accrual_enabled: bool,
    pub accrual_timezone: Tz,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let db = DbConfig::from_env()?;

        let bind_address = std::env::var("BIND_ADDRESS").unwrap_or_else(|_| "0.0.0.0".to_string());

        let port = match std::env::var("PORT") {
            Ok(port) => port.parse::<u16>().context("PORT must be a valid port number")?,
            Err(_) => 3009,
        };

        let accrual_enabled = match std::env::var("ACCRUAL_ENABLED") {
            Ok(value) => value
                .parse::<bool>()
                .context("ACCRUAL_ENABLED must be `true` or `false`")?,
            Err(_) => true,
        };

        let accrual_timezone = match std::env::var("ACCRUAL_TIMEZONE") {
            Ok(name) => name
                .parse::<Tz>()
                .map_err(|e| anyhow::anyhow!("ACCRUAL_TIMEZONE is not a known time zone: {}", e))?,
            Err(_) => Tz::UTC,
        };

        Ok(Self {
            db,
            bind_address,
            port,
            accrual_enabled,
            accrual_timezone,
        })
    }

    pub async fn create_app_state(&self) -> anyhow::Result<AppState> {
        let db = Database::new(&self.db)
            .await
            .context("Failed to initialize AppState")?;
        log::info!("Database pool initialized successfully!");
        Ok(AppState::new(Arc::new(db)))
    }
}
