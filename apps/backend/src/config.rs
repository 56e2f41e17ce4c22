//! Service configuration loaded from the environment.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

use thiserror::Error;

const DEFAULT_PORT: u16 = 3000;
const DEFAULT_MAX_CONNECTIONS: u32 = 10;
const DEFAULT_RATE_LIMIT_WINDOW_SECS: u64 = 60;
const DEFAULT_RATE_LIMIT_MAX: u64 = 120;
const DEFAULT_QUEUE_LIMIT: usize = 20;
const DEFAULT_QUEUE_MAX_LIMIT: usize = 200;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
}

/// Per-user request budget.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RateLimitConfig {
    pub window: Duration,
    pub max: u64,
}

/// Bounds for the study queue prefix.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QueueConfig {
    pub default_limit: usize,
    pub max_limit: usize,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub host: IpAddr,
    pub port: u16,
    pub log_level: String,
    pub db_max_connections: u32,
    pub scheduler: String,
    pub rate_limit: RateLimitConfig,
    pub queue: QueueConfig,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; unparsable values fall back to defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup("DATABASE_URL")
            .filter(|v| !v.trim().is_empty())
            .ok_or(ConfigError::Missing("DATABASE_URL"))?;

        let host = parsed(&lookup, "HOST").unwrap_or(IpAddr::V4(Ipv4Addr::new(0, 0, 0, 0)));
        let port = parsed(&lookup, "PORT").unwrap_or(DEFAULT_PORT);
        let log_level = lookup("RUST_LOG").unwrap_or_else(|| "info".to_string());
        let db_max_connections =
            parsed(&lookup, "DB_MAX_CONNECTIONS").unwrap_or(DEFAULT_MAX_CONNECTIONS);
        let scheduler = lookup("SCHEDULER").unwrap_or_else(|| "sm2".to_string());

        let rate_limit = RateLimitConfig {
            window: Duration::from_secs(
                parsed(&lookup, "RATE_LIMIT_WINDOW_SECS")
                    .filter(|secs: &u64| *secs > 0)
                    .unwrap_or(DEFAULT_RATE_LIMIT_WINDOW_SECS),
            ),
            max: parsed(&lookup, "RATE_LIMIT_MAX").unwrap_or(DEFAULT_RATE_LIMIT_MAX),
        };

        let max_limit = parsed(&lookup, "STUDY_QUEUE_MAX_LIMIT")
            .filter(|n: &usize| *n > 0)
            .unwrap_or(DEFAULT_QUEUE_MAX_LIMIT);
        let default_limit = parsed(&lookup, "STUDY_QUEUE_DEFAULT_LIMIT")
            .filter(|n: &usize| *n > 0)
            .unwrap_or(DEFAULT_QUEUE_LIMIT)
            .min(max_limit);

        Ok(Self {
            database_url,
            host,
            port,
            log_level,
            db_max_connections,
            scheduler,
            rate_limit,
            queue: QueueConfig {
                default_limit,
                max_limit,
            },
        })
    }

    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

fn parsed<T, F>(lookup: &F, key: &str) -> Option<T>
where
    T: std::str::FromStr,
    F: Fn(&str) -> Option<String>,
{
    let raw = lookup(key)?;
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    match trimmed.parse() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!("Ignoring invalid {}={:?}, using default", key, raw);
            None
        }
    }
}
