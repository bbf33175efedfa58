//! Service configuration from environment variables.

use crate::error::{ApiError, Result};

/// Runtime configuration.
///
/// Read from the environment (a `.env` file is loaded first when present):
/// - HOST: bind address (default "0.0.0.0")
/// - PORT: bind port (default 3000)
/// - DATABASE_URL: PostgreSQL connection string; when unset, progress and
///   results are kept in memory only
/// - DATABASE_MAX_CONNECTIONS: pool size (default 10)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub database_url: Option<String>,
    pub max_connections: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            database_url: None,
            max_connections: 10,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Self::default();

        let port = match lookup("PORT") {
            Some(value) => value
                .parse()
                .map_err(|_| ApiError::Config(format!("PORT is not a valid port: {}", value)))?,
            None => defaults.port,
        };

        let max_connections = match lookup("DATABASE_MAX_CONNECTIONS") {
            Some(value) => value.parse().map_err(|_| {
                ApiError::Config(format!("DATABASE_MAX_CONNECTIONS is not a number: {}", value))
            })?,
            None => defaults.max_connections,
        };

        Ok(Self {
            host: lookup("HOST").unwrap_or(defaults.host),
            port,
            database_url: lookup("DATABASE_URL").filter(|url| !url.is_empty()),
            max_connections,
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
