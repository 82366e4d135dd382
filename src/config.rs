use std::net::SocketAddr;

use thiserror::Error;

/// Server configuration from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    pub listen_addr: SocketAddr,
    pub database_url: String,
}

impl Config {
    /// Load configuration from environment variables.
    /// DATABASE_URL defaults to "sqlite://hifz.db", LISTEN_ADDR to "0.0.0.0:3000".
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let database_url = lookup("DATABASE_URL")
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| "sqlite://hifz.db".to_string());

        let listen_addr = lookup("LISTEN_ADDR")
            .unwrap_or_else(|| "0.0.0.0:3000".to_string())
            .parse()
            .map_err(|_| ConfigError::Invalid("LISTEN_ADDR", "must be a valid socket address"))?;

        Ok(Config {
            listen_addr,
            database_url,
        })
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}: {1}")]
    Invalid(&'static str, &'static str),
}
