//! Configuration management for the Garden for All harvest tracker
//!
//! Later sources win: built-in defaults, then `config/<environment>.toml`,
//! then `GFA_*` environment variables (`__` separates nested keys).

use config::{ConfigError, Environment, File};
use serde::Deserialize;

/// Settings resolved once at startup
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// `development` runs migrations on startup
    pub environment: String,

    pub server: ServerConfig,

    pub database: DatabaseConfig,

    /// JWT validation configuration
    pub jwt: JwtConfig,

    /// Dashboard aggregation limits
    pub dashboard: DashboardConfig,

    /// Report export settings
    pub export: ExportConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,

    /// Bind address, `0.0.0.0` to listen on all interfaces
    pub host: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,

    pub max_connections: u32,
    /// Idle connections kept open
    pub min_connections: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct JwtConfig {
    /// Secret key used to verify HS256 tokens
    pub secret: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DashboardConfig {
    /// Maximum number of points in the production trend
    pub trend_points: usize,

    /// Maximum number of harvest entries loaded for the charts
    pub harvest_fetch_limit: i64,

    /// Number of entries in the recent harvests list
    pub recent_entries: usize,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ExportConfig {
    /// Prefix for exported file names
    pub file_prefix: String,
}

impl Config {
    pub fn load() -> Result<Self, ConfigError> {
        let environment = std::env::var("GFA_ENVIRONMENT").unwrap_or_else(|_| "development".into());

        let config = config::Config::builder()
            .set_default("environment", environment.clone())?
            .set_default("server.port", 3000)?
            .set_default("server.host", "0.0.0.0")?
            .set_default("database.max_connections", 10)?
            .set_default("database.min_connections", 2)?
            .set_default("dashboard.trend_points", 500)?
            .set_default("dashboard.harvest_fetch_limit", 500)?
            .set_default("dashboard.recent_entries", 10)?
            .set_default("export.file_prefix", shared::DEFAULT_FILE_PREFIX)?
            .add_source(File::with_name(&format!("config/{}", environment)).required(false))
            .add_source(
                Environment::with_prefix("GFA")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            host: "0.0.0.0".to_string(),
        }
    }
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            trend_points: shared::DEFAULT_TREND_POINTS,
            harvest_fetch_limit: 500,
            recent_entries: shared::DEFAULT_RECENT_ENTRIES,
        }
    }
}
