use std::net::SocketAddr;
use thiserror::Error;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
const DEFAULT_UTC_OFFSET_HOURS: i32 = -5;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("BIND_ADDR '{0}' is not a socket address")]
    InvalidBindAddr(String),

    #[error("PUZZLE_UTC_OFFSET_HOURS '{0}' must be a whole number of hours between -23 and 23")]
    InvalidUtcOffset(String),
}

/// Process configuration read from the environment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    /// Postgres backend when set, in-memory store otherwise
    pub database_url: Option<String>,
    /// Offset of the clock that decides which puzzle is "today"
    pub utc_offset_hours: i32,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let raw_bind = lookup("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr: SocketAddr = raw_bind
            .parse()
            .map_err(|_| ConfigError::InvalidBindAddr(raw_bind.clone()))?;

        let database_url = lookup("DATABASE_URL").filter(|url| !url.trim().is_empty());

        let utc_offset_hours = match lookup("PUZZLE_UTC_OFFSET_HOURS") {
            None => DEFAULT_UTC_OFFSET_HOURS,
            Some(raw) => raw
                .trim()
                .parse::<i32>()
                .ok()
                .filter(|hours| (-23..=23).contains(hours))
                .ok_or(ConfigError::InvalidUtcOffset(raw))?,
        };

        Ok(Self {
            bind_addr,
            database_url,
            utc_offset_hours,
        })
    }
}
