//! services/storefront/src/config.rs
//!
//! Defines the application's configuration structure and loading logic.
//!
//! All configuration is loaded from environment variables at startup. The `.env`
//! file is used for local development.

use axum::http::HeaderValue;
use chrono::Duration;
use rust_decimal::Decimal;
use std::net::SocketAddr;
use std::str::FromStr;
use tracing::Level;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing the environment variable {0}")]
    MissingVar(String),
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Where the storefront keeps its data.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DatabaseBackend {
    /// A PostgreSQL connection string.
    Postgres(String),
    /// Process-local storage, selected with `DATABASE_URL=memory://`.
    Memory,
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub bind_address: SocketAddr,
    pub database: DatabaseBackend,
    pub log_level: Level,
    pub secret_key: String,
    pub public_base_url: String,
    pub allowed_origin: HeaderValue,
    pub shipping_fee: Decimal,
    pub session_ttl: Duration,
    pub activation_timeout: Duration,
    pub mail_from: String,
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// It will look for a `.env` file in the current directory for development,
    /// but this is skipped in test environments to ensure tests are hermetic.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Only load from .env in non-test mode to avoid contamination.
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }

        // --- Load Server and Database Settings ---
        let bind_address = parse_var("BIND_ADDRESS", "0.0.0.0:3000")?;

        let database_url = std::env::var("DATABASE_URL")
            .map_err(|_| ConfigError::MissingVar("DATABASE_URL".to_string()))?;
        let database = if database_url.starts_with("memory://") {
            DatabaseBackend::Memory
        } else {
            DatabaseBackend::Postgres(database_url)
        };

        let log_level_str = std::env::var("RUST_LOG").unwrap_or_else(|_| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        // --- Load Secrets and Public URLs ---
        let secret_key = std::env::var("SECRET_KEY")
            .map_err(|_| ConfigError::MissingVar("SECRET_KEY".to_string()))?;
        if secret_key.len() < 16 {
            return Err(ConfigError::InvalidValue(
                "SECRET_KEY".to_string(),
                "must be at least 16 bytes long".to_string(),
            ));
        }

        let public_base_url = std::env::var("PUBLIC_BASE_URL")
            .unwrap_or_else(|_| "http://localhost:3000".to_string())
            .trim_end_matches('/')
            .to_string();
        let allowed_origin = std::env::var("ALLOWED_ORIGIN")
            .unwrap_or_else(|_| public_base_url.clone())
            .parse::<HeaderValue>()
            .map_err(|e| ConfigError::InvalidValue("ALLOWED_ORIGIN".to_string(), e.to_string()))?;

        // --- Load Storefront Settings ---
        let shipping_fee: Decimal = parse_var("SHIPPING_FEE", "0")?;
        if shipping_fee.is_sign_negative() {
            return Err(ConfigError::InvalidValue(
                "SHIPPING_FEE".to_string(),
                "must not be negative".to_string(),
            ));
        }
        let session_ttl = Duration::days(parse_var("SESSION_TTL_DAYS", "14")?);
        let activation_timeout = Duration::days(parse_var("ACTIVATION_TIMEOUT_DAYS", "3")?);
        let mail_from =
            std::env::var("MAIL_FROM").unwrap_or_else(|_| "no-reply@localhost".to_string());

        Ok(Self {
            bind_address,
            database,
            log_level,
            secret_key,
            public_base_url,
            allowed_origin,
            shipping_fee,
            session_ttl,
            activation_timeout,
            mail_from,
        })
    }
}

/// Reads `name`, falling back to `default`, and parses it.
fn parse_var<T>(name: &str, default: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let raw = std::env::var(name).unwrap_or_else(|_| default.to_string());
    raw.trim()
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidValue(name.to_string(), e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_var_reports_the_variable_name() {
        let err = parse_var::<i64>("STOREFRONT_TEST_UNSET_VARIABLE", "seven").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue(name, _) if name == "STOREFRONT_TEST_UNSET_VARIABLE"));
    }

    #[test]
    fn parse_var_uses_the_default() {
        let fee: Decimal = parse_var("STOREFRONT_TEST_UNSET_FEE", "4.95").unwrap();
        assert_eq!(fee, Decimal::new(495, 2));
    }
}
