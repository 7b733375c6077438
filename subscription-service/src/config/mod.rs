//! Configuration module for subscription-service.

use service_core::config as core_config;
use service_core::error::AppError;
use sqlx::postgres::{PgConnectOptions, PgSslMode};
use std::env;
use std::str::FromStr;

#[derive(Debug, Clone)]
pub struct SubscriptionConfig {
    pub common: core_config::Config,
    pub service_name: String,
    pub service_version: String,
    pub log_level: String,
    pub otlp_endpoint: Option<String>,
    pub database: DatabaseConfig,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub connect_options: PgConnectOptions,
    pub max_connections: u32,
    pub min_connections: u32,
}

impl SubscriptionConfig {
    pub fn from_env() -> Result<Self, AppError> {
        let common = core_config::Config::load()?;

        Ok(Self {
            common,
            service_name: env::var("SERVICE_NAME")
                .unwrap_or_else(|_| "subscription-service".to_string()),
            service_version: env::var("SERVICE_VERSION")
                .unwrap_or_else(|_| env!("CARGO_PKG_VERSION").to_string()),
            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            otlp_endpoint: env::var("OTLP_ENDPOINT").ok().filter(|s| !s.is_empty()),
            database: DatabaseConfig {
                connect_options: connect_options_from(|key| env::var(key).ok())?,
                max_connections: parse_or("DATABASE_MAX_CONNECTIONS", 10)?,
                min_connections: parse_or("DATABASE_MIN_CONNECTIONS", 2)?,
            },
        })
    }
}

fn parse_or(key: &str, default: u32) -> Result<u32, AppError> {
    match env::var(key) {
        Ok(raw) => raw.parse().map_err(|e| {
            AppError::ConfigError(anyhow::anyhow!("{} must be a positive integer: {}", key, e))
        }),
        Err(_) => Ok(default),
    }
}

/// `DATABASE_URL` wins; otherwise the connection is assembled from the discrete
/// `DB_HOST`, `DB_PORT`, `DB_USER`, `DB_PASSWORD` and `DB_NAME` settings.
/// Discrete values are passed through as-is, never spliced into a URL.
fn connect_options_from(
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<PgConnectOptions, AppError> {
    if let Some(url) = lookup("DATABASE_URL").filter(|s| !s.is_empty()) {
        return PgConnectOptions::from_str(&url).map_err(|e| {
            AppError::ConfigError(anyhow::anyhow!("DATABASE_URL is not a valid URL: {}", e))
        });
    }

    let var = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());
    let port: u16 = var("DB_PORT", "5432").parse().map_err(|e| {
        AppError::ConfigError(anyhow::anyhow!("DB_PORT must be a port number: {}", e))
    })?;

    Ok(PgConnectOptions::new()
        .host(&var("DB_HOST", "localhost"))
        .port(port)
        .username(&var("DB_USER", "postgres"))
        .password(&var("DB_PASSWORD", "postgres"))
        .database(&var("DB_NAME", "subs_db"))
        .ssl_mode(PgSslMode::Disable))
}
